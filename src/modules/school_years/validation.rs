//! Interval validation for school years and their periods.
//!
//! Pure checks invoked by the services before anything is written:
//! year-duration bounds, period well-formedness, and non-overlap within a
//! track. Tracks are validated independently: a trimester track and a
//! semester track may cover the same calendar span.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use scolaris_core::AppError;
use scolaris_models::YearPeriodDto;

/// Minimum school year duration: 3 months.
pub const MIN_YEAR_DAYS: i64 = 90;
/// Maximum school year duration: 18 months.
pub const MAX_YEAR_DAYS: i64 = 548;

/// Validate that a school year spans an acceptable duration.
pub fn validate_year_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "End date must be after start date"
        )));
    }

    let days = (end - start).num_days();
    if days < MIN_YEAR_DAYS {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "School year duration must be at least 3 months ({MIN_YEAR_DAYS} days), got {days}"
        )));
    }
    if days > MAX_YEAR_DAYS {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "School year duration cannot exceed 18 months ({MAX_YEAR_DAYS} days), got {days}"
        )));
    }

    Ok(())
}

/// Validate a period list against the year range.
///
/// Periods are grouped by track; within each group, ordered by sequence,
/// every period must lie inside `[year_start, year_end]` with `start < end`,
/// and consecutive periods must be strictly separated
/// (`next.start > current.end`). Fails fast on the first violation.
pub fn validate_periods(
    periods: &[YearPeriodDto],
    year_start: NaiveDate,
    year_end: NaiveDate,
) -> Result<(), AppError> {
    if periods.is_empty() {
        return Ok(());
    }

    let mut by_track: BTreeMap<&str, Vec<&YearPeriodDto>> = BTreeMap::new();
    for period in periods {
        by_track.entry(period.track.as_str()).or_default().push(period);
    }

    for (track, mut group) in by_track {
        group.sort_by_key(|p| p.sequence);

        for period in &group {
            if period.end_date <= period.start_date {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Period '{}' has an invalid date range (end must be after start)",
                    period.name
                )));
            }
            if period.start_date < year_start {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Period '{}' starts before the school year ({} < {})",
                    period.name,
                    period.start_date,
                    year_start
                )));
            }
            if period.end_date > year_end {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Period '{}' ends after the school year ({} > {})",
                    period.name,
                    period.end_date,
                    year_end
                )));
            }
        }

        for pair in group.windows(2) {
            if pair[1].start_date <= pair[0].end_date {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Periods '{}' and '{}' overlap or are not properly separated ({track})",
                    pair[0].name,
                    pair[1].name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scolaris_models::LifecycleStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(name: &str, seq: i32, track: &str, start: NaiveDate, end: NaiveDate) -> YearPeriodDto {
        YearPeriodDto {
            name: name.to_string(),
            sequence: seq,
            track: track.to_string(),
            start_date: start,
            end_date: end,
            evaluation_deadline: None,
            report_card_deadline: None,
            status: Some(LifecycleStatus::Upcoming),
        }
    }

    #[test]
    fn test_year_range_accepts_in_bounds() {
        // 2024-09-01..2025-06-30 is 302 days
        assert!(validate_year_range(date(2024, 9, 1), date(2025, 6, 30)).is_ok());
        // Exact boundaries
        assert!(validate_year_range(date(2024, 1, 1), date(2024, 3, 31)).is_ok()); // 90 days
        assert!(
            validate_year_range(date(2024, 1, 1), date(2024, 1, 1) + chrono::Duration::days(548))
                .is_ok()
        );
    }

    #[test]
    fn test_year_range_rejects_too_short() {
        let err = validate_year_range(date(2024, 9, 1), date(2024, 10, 31)).unwrap_err();
        assert!(err.error.to_string().contains("at least 3 months"));
        // One day under the boundary
        assert!(
            validate_year_range(date(2024, 1, 1), date(2024, 1, 1) + chrono::Duration::days(89))
                .is_err()
        );
    }

    #[test]
    fn test_year_range_rejects_too_long() {
        let err = validate_year_range(
            date(2024, 1, 1),
            date(2024, 1, 1) + chrono::Duration::days(549),
        )
        .unwrap_err();
        assert!(err.error.to_string().contains("cannot exceed 18 months"));
    }

    #[test]
    fn test_year_range_rejects_reversed_dates() {
        assert!(validate_year_range(date(2025, 6, 30), date(2024, 9, 1)).is_err());
        assert!(validate_year_range(date(2024, 9, 1), date(2024, 9, 1)).is_err());
    }

    #[test]
    fn test_empty_period_list_is_valid() {
        assert!(validate_periods(&[], date(2024, 9, 1), date(2025, 6, 30)).is_ok());
    }

    #[test]
    fn test_valid_trimester_sequence() {
        let periods = vec![
            period("T1", 1, "TRIMESTER", date(2024, 9, 1), date(2024, 11, 30)),
            period("T2", 2, "TRIMESTER", date(2024, 12, 1), date(2025, 3, 15)),
            period("T3", 3, "TRIMESTER", date(2025, 3, 16), date(2025, 6, 30)),
        ];
        assert!(validate_periods(&periods, date(2024, 9, 1), date(2025, 6, 30)).is_ok());
    }

    #[test]
    fn test_rejects_touching_periods() {
        // period2 starts the day period1 ends: strict separation required
        let periods = vec![
            period("T1", 1, "TRIMESTER", date(2024, 9, 1), date(2024, 12, 1)),
            period("T2", 2, "TRIMESTER", date(2024, 12, 1), date(2025, 3, 15)),
        ];
        let err = validate_periods(&periods, date(2024, 9, 1), date(2025, 6, 30)).unwrap_err();
        assert!(err.error.to_string().contains("overlap"));
    }

    #[test]
    fn test_rejects_overlapping_periods() {
        let periods = vec![
            period("T1", 1, "TRIMESTER", date(2024, 9, 1), date(2024, 12, 20)),
            period("T2", 2, "TRIMESTER", date(2024, 12, 1), date(2025, 3, 15)),
        ];
        assert!(validate_periods(&periods, date(2024, 9, 1), date(2025, 6, 30)).is_err());
    }

    #[test]
    fn test_parallel_tracks_may_overlap_each_other() {
        // Trimesters and semesters cover the same span; only intra-track
        // overlap is an error.
        let periods = vec![
            period("T1", 1, "TRIMESTER", date(2024, 9, 1), date(2024, 11, 30)),
            period("T2", 2, "TRIMESTER", date(2024, 12, 1), date(2025, 6, 30)),
            period("S1", 1, "SEMESTER", date(2024, 9, 1), date(2025, 1, 31)),
            period("S2", 2, "SEMESTER", date(2025, 2, 1), date(2025, 6, 30)),
        ];
        assert!(validate_periods(&periods, date(2024, 9, 1), date(2025, 6, 30)).is_ok());
    }

    #[test]
    fn test_rejects_period_outside_year_bounds() {
        let before = vec![period(
            "T1",
            1,
            "TRIMESTER",
            date(2024, 8, 15),
            date(2024, 11, 30),
        )];
        let err = validate_periods(&before, date(2024, 9, 1), date(2025, 6, 30)).unwrap_err();
        assert!(err.error.to_string().contains("starts before"));

        let after = vec![period(
            "T3",
            3,
            "TRIMESTER",
            date(2025, 4, 1),
            date(2025, 7, 15),
        )];
        let err = validate_periods(&after, date(2024, 9, 1), date(2025, 6, 30)).unwrap_err();
        assert!(err.error.to_string().contains("ends after"));
    }

    #[test]
    fn test_rejects_inverted_period() {
        let periods = vec![period(
            "T1",
            1,
            "TRIMESTER",
            date(2024, 12, 1),
            date(2024, 9, 1),
        )];
        let err = validate_periods(&periods, date(2024, 9, 1), date(2025, 6, 30)).unwrap_err();
        assert!(err.error.to_string().contains("invalid date range"));
    }

    #[test]
    fn test_ordering_follows_sequence_not_input_order() {
        // Listed out of order but sequences define a valid chain
        let periods = vec![
            period("T2", 2, "TRIMESTER", date(2024, 12, 1), date(2025, 3, 15)),
            period("T1", 1, "TRIMESTER", date(2024, 9, 1), date(2024, 11, 30)),
        ];
        assert!(validate_periods(&periods, date(2024, 9, 1), date(2025, 6, 30)).is_ok());
    }
}
