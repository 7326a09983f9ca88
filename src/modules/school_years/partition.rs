//! Auto-partitioning of a school year into periods.
//!
//! Given the year span and a list of requested tracks, produces one
//! gap-free period set per recognized track (`TRIMESTER` → 3,
//! `SEMESTER` → 2). Unrecognized tracks yield no periods.

use chrono::{Duration, NaiveDate};
use scolaris_models::{LifecycleStatus, YearPeriodDto, tracks};

/// Generate the initial period set for the given tracks.
///
/// Each recognized track is split into equal slices of
/// `total_days / count` days; the last period absorbs the integer-division
/// remainder so the union exactly covers `[year_start, year_end]` with no
/// gap. The first period of each track is created ACTIVE, the rest
/// UPCOMING.
pub fn generate_periods(
    year_start: NaiveDate,
    year_end: NaiveDate,
    requested_tracks: &[String],
) -> Vec<YearPeriodDto> {
    let total_days = (year_end - year_start).num_days();
    let mut periods = Vec::new();

    for track in requested_tracks {
        let Some(count) = tracks::period_count(track) else {
            continue;
        };

        let count = count as i64;
        let days_per_period = total_days / count;
        let label = tracks::display_label(track);

        for i in 1..=count {
            let start = year_start + Duration::days((i - 1) * days_per_period);
            let end = if i == count {
                year_end
            } else {
                year_start + Duration::days(i * days_per_period - 1)
            };

            periods.push(YearPeriodDto {
                name: format!("{label} {i}"),
                sequence: i as i32,
                track: track.clone(),
                start_date: start,
                end_date: end,
                evaluation_deadline: None,
                report_card_deadline: None,
                status: Some(if i == 1 {
                    LifecycleStatus::Active
                } else {
                    LifecycleStatus::Upcoming
                }),
            });
        }
    }

    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trimester_partition_covers_year() {
        let start = date(2024, 9, 1);
        let end = date(2025, 6, 30);
        let periods = generate_periods(start, end, &["TRIMESTER".to_string()]);

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0].name, "Trimestre 1");
        assert_eq!(periods[0].start_date, start);
        assert_eq!(periods[2].end_date, end);

        // Contiguous: each period starts the day after the previous ends
        for pair in periods.windows(2) {
            assert_eq!(pair[1].start_date, pair[0].end_date + Duration::days(1));
        }
    }

    #[test]
    fn test_last_period_absorbs_remainder() {
        // 302 days / 3 = 100 with remainder 2; the last slice is longer
        let start = date(2024, 9, 1);
        let end = date(2025, 6, 30);
        let periods = generate_periods(start, end, &["TRIMESTER".to_string()]);

        let first_len = (periods[0].end_date - periods[0].start_date).num_days();
        let last_len = (periods[2].end_date - periods[2].start_date).num_days();
        assert_eq!(first_len, 99);
        assert!(last_len > first_len);
        assert_eq!(periods[2].end_date, end);
    }

    #[test]
    fn test_first_period_active_rest_upcoming() {
        let periods = generate_periods(
            date(2024, 9, 1),
            date(2025, 6, 30),
            &["TRIMESTER".to_string()],
        );
        assert_eq!(periods[0].status, Some(LifecycleStatus::Active));
        assert_eq!(periods[1].status, Some(LifecycleStatus::Upcoming));
        assert_eq!(periods[2].status, Some(LifecycleStatus::Upcoming));
    }

    #[test]
    fn test_semester_partition() {
        let periods = generate_periods(
            date(2024, 9, 1),
            date(2025, 6, 30),
            &["SEMESTER".to_string()],
        );
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].name, "Semestre 1");
        assert_eq!(periods[1].name, "Semestre 2");
        assert_eq!(periods[1].end_date, date(2025, 6, 30));
    }

    #[test]
    fn test_parallel_tracks_generate_independently() {
        let periods = generate_periods(
            date(2024, 9, 1),
            date(2025, 6, 30),
            &["TRIMESTER".to_string(), "SEMESTER".to_string()],
        );
        assert_eq!(periods.len(), 5);
        let actives = periods
            .iter()
            .filter(|p| p.status == Some(LifecycleStatus::Active))
            .count();
        // One active per track
        assert_eq!(actives, 2);
    }

    #[test]
    fn test_unrecognized_track_yields_nothing() {
        let periods = generate_periods(
            date(2024, 9, 1),
            date(2025, 6, 30),
            &["QUARTER".to_string()],
        );
        assert!(periods.is_empty());
    }

    #[test]
    fn test_generated_set_passes_validation() {
        let start = date(2024, 9, 1);
        let end = date(2025, 6, 30);
        let periods = generate_periods(
            start,
            end,
            &["TRIMESTER".to_string(), "SEMESTER".to_string()],
        );
        assert!(super::super::validation::validate_periods(&periods, start, end).is_ok());
    }
}
