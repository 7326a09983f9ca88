use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use chrono::NaiveDate;
use scolaris_core::{AppError, PaginationMeta};
use scolaris_models::ids::{PeriodId, SchoolYearId, TenantId};
use scolaris_models::periods::{
    CreatePeriodDto, PaginatedPeriodsResponse, Period, PeriodFilterParams, PeriodWithYearInfo,
    UpdatePeriodDto,
};
use scolaris_models::school_years::YearPeriodDto;
use scolaris_models::value_types::LifecycleStatus;

use crate::modules::school_years::validation;

pub struct PeriodService;

/// Columns returned for a bare `Period` row.
const PERIOD_COLUMNS: &str = "id, year_id, tenant_id, name, sequence, track, start_date, \
     end_date, evaluation_deadline, report_card_deadline, status, created_at, updated_at";

/// Columns for a period joined with its owning year.
const PERIOD_WITH_YEAR_COLUMNS: &str = "p.id, p.year_id, p.tenant_id, p.name, p.sequence, \
     p.track, p.start_date, p.end_date, p.evaluation_deadline, p.report_card_deadline, \
     p.status, s.label AS year_label, s.start_date AS year_start_date, \
     s.end_date AS year_end_date, s.status AS year_status, p.created_at, p.updated_at";

pub(crate) fn map_period_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        if db_err.message().contains("unique_period_slot_per_track") {
            return AppError::conflict(anyhow::anyhow!(
                "A period with this sequence already exists in this track"
            ));
        }
        if db_err.message().contains("one_active_period_per_track") {
            return AppError::conflict(anyhow::anyhow!(
                "Another period in this track is already active"
            ));
        }
    }
    AppError::from(e)
}

/// Demote every ACTIVE period of the `(year, track)` group (except `keep`)
/// to COMPLETED.
///
/// Idempotent; must run in the same transaction as the write that sets a
/// period ACTIVE, and before it, so the partial unique index never sees
/// two ACTIVE rows in one track.
pub(crate) async fn enforce_single_active_period(
    tx: &mut Transaction<'_, Postgres>,
    year_id: SchoolYearId,
    track: &str,
    keep: Option<PeriodId>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"UPDATE periods
           SET status = 'COMPLETED', updated_at = NOW()
           WHERE year_id = $1 AND track = $2 AND status = 'ACTIVE'
             AND ($3::uuid IS NULL OR id <> $3)"#,
    )
    .bind(year_id)
    .bind(track)
    .bind(keep.map(|k| k.0))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

fn validate_period_range(
    start_date: NaiveDate,
    end_date: NaiveDate,
    year_start: NaiveDate,
    year_end: NaiveDate,
) -> Result<(), AppError> {
    if end_date <= start_date {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "End date must be after start date"
        )));
    }
    if start_date < year_start || end_date > year_end {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "Period dates must fall within the school year ({} to {})",
            year_start,
            year_end
        )));
    }
    Ok(())
}

/// Validate a candidate row against its track siblings.
///
/// Merges the candidate with the persisted periods of its `(year, track)`
/// group (minus `exclude` on update) and runs the same ordered-pairs check
/// the year endpoints apply: sorted by sequence, consecutive periods must
/// be strictly separated, so sequence order always matches date order.
async fn check_track_consistency(
    db: &PgPool,
    year_id: SchoolYearId,
    year_start: NaiveDate,
    year_end: NaiveDate,
    candidate: &YearPeriodDto,
    exclude: Option<PeriodId>,
) -> Result<(), AppError> {
    let siblings = sqlx::query_as::<_, (String, i32, NaiveDate, NaiveDate)>(
        r#"SELECT name, sequence, start_date, end_date FROM periods
           WHERE year_id = $1 AND track = $2
             AND ($3::uuid IS NULL OR id <> $3)"#,
    )
    .bind(year_id)
    .bind(&candidate.track)
    .bind(exclude.map(|k| k.0))
    .fetch_all(db)
    .await?;

    let mut merged: Vec<YearPeriodDto> = siblings
        .into_iter()
        .map(|(name, sequence, start_date, end_date)| YearPeriodDto {
            name,
            sequence,
            track: candidate.track.clone(),
            start_date,
            end_date,
            evaluation_deadline: None,
            report_card_deadline: None,
            status: None,
        })
        .collect();
    merged.push(candidate.clone());

    validation::validate_periods(&merged, year_start, year_end)
}

async fn year_bounds(
    db: &PgPool,
    year_id: SchoolYearId,
    tenant_id: TenantId,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    sqlx::query_as::<_, (NaiveDate, NaiveDate)>(
        "SELECT start_date, end_date FROM school_years WHERE id = $1 AND tenant_id = $2",
    )
    .bind(year_id)
    .bind(tenant_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School year not found")))
}

impl PeriodService {
    /// Add a single period to an existing school year.
    ///
    /// The period must fit inside the year's date range and, merged with
    /// its track siblings, keep the track strictly separated in sequence
    /// order. When `sequence` is omitted the next free slot in the track
    /// is used.
    #[instrument(skip(db, dto))]
    pub async fn create_period(
        db: &PgPool,
        tenant_id: TenantId,
        dto: CreatePeriodDto,
    ) -> Result<Period, AppError> {
        let (year_start, year_end) = year_bounds(db, dto.year_id, tenant_id).await?;

        validate_period_range(dto.start_date, dto.end_date, year_start, year_end)?;

        let sequence = match dto.sequence {
            Some(sequence) => sequence,
            None => {
                sqlx::query_scalar::<_, i32>(
                    "SELECT COALESCE(MAX(sequence), 0) + 1 FROM periods \
                     WHERE year_id = $1 AND track = $2",
                )
                .bind(dto.year_id)
                .bind(&dto.track)
                .fetch_one(db)
                .await?
            }
        };

        let candidate = YearPeriodDto {
            name: dto.name.clone(),
            sequence,
            track: dto.track.clone(),
            start_date: dto.start_date,
            end_date: dto.end_date,
            evaluation_deadline: dto.evaluation_deadline,
            report_card_deadline: dto.report_card_deadline,
            status: dto.status,
        };
        check_track_consistency(db, dto.year_id, year_start, year_end, &candidate, None).await?;

        let status = dto.status.unwrap_or(LifecycleStatus::Upcoming);

        let mut tx = db.begin().await?;

        if status.is_active() {
            enforce_single_active_period(&mut tx, dto.year_id, &dto.track, None).await?;
        }

        let period = sqlx::query_as::<_, Period>(&format!(
            r#"INSERT INTO periods
               (year_id, tenant_id, name, sequence, track, start_date, end_date,
                evaluation_deadline, report_card_deadline, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {PERIOD_COLUMNS}"#
        ))
        .bind(dto.year_id)
        .bind(tenant_id)
        .bind(&dto.name)
        .bind(sequence)
        .bind(&dto.track)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(dto.evaluation_deadline)
        .bind(dto.report_card_deadline)
        .bind(status)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_period_unique_violation)?;

        tx.commit().await?;

        Ok(period)
    }

    /// Get paginated periods of a school year, ordered by track then
    /// sequence.
    #[instrument(skip(db))]
    pub async fn get_periods_by_year(
        db: &PgPool,
        year_id: SchoolYearId,
        tenant_id: TenantId,
        filters: PeriodFilterParams,
    ) -> Result<PaginatedPeriodsResponse, AppError> {
        // Scope check before listing so a foreign year reads as missing.
        year_bounds(db, year_id, tenant_id).await?;

        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        if let Some(track) = &filters.track {
            where_clause.push_str(&format!(" AND track = '{}'", track.replace('\'', "''")));
        }
        if let Some(status) = filters.status {
            where_clause.push_str(&format!(" AND status = '{}'", status));
        }

        let mut count_query = String::from("SELECT COUNT(*) FROM periods WHERE year_id = $1");
        count_query.push_str(&where_clause);

        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(year_id)
            .fetch_one(db)
            .await?;

        let mut data_query =
            format!("SELECT {PERIOD_COLUMNS} FROM periods WHERE year_id = $1");
        data_query.push_str(&where_clause);
        data_query.push_str(" ORDER BY track, sequence");
        data_query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let periods = sqlx::query_as::<_, Period>(&data_query)
            .bind(year_id)
            .fetch_all(db)
            .await?;

        let has_more = offset + limit < total;

        Ok(PaginatedPeriodsResponse {
            data: periods,
            meta: PaginationMeta {
                total,
                limit,
                offset,
                has_more,
            },
        })
    }

    /// Get a period by ID with its owning year, scoped to the tenant.
    #[instrument(skip(db))]
    pub async fn get_period_by_id(
        db: &PgPool,
        period_id: PeriodId,
        tenant_id: TenantId,
    ) -> Result<PeriodWithYearInfo, AppError> {
        let period = sqlx::query_as::<_, PeriodWithYearInfo>(&format!(
            r#"SELECT {PERIOD_WITH_YEAR_COLUMNS}
               FROM periods p
               JOIN school_years s ON s.id = p.year_id
               WHERE p.id = $1 AND p.tenant_id = $2"#
        ))
        .bind(period_id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Period not found")))?;

        Ok(period)
    }

    /// Get the ACTIVE periods of the tenant's ACTIVE school year, one per
    /// track at most.
    #[instrument(skip(db))]
    pub async fn get_active_periods(
        db: &PgPool,
        tenant_id: TenantId,
    ) -> Result<Vec<PeriodWithYearInfo>, AppError> {
        let periods = sqlx::query_as::<_, PeriodWithYearInfo>(&format!(
            r#"SELECT {PERIOD_WITH_YEAR_COLUMNS}
               FROM periods p
               JOIN school_years s ON s.id = p.year_id
               WHERE p.tenant_id = $1 AND p.status = 'ACTIVE' AND s.status = 'ACTIVE'
               ORDER BY p.track"#
        ))
        .bind(tenant_id)
        .fetch_all(db)
        .await?;

        Ok(periods)
    }

    /// Update a period.
    ///
    /// Merged dates are revalidated against the year bounds and against
    /// siblings in the (possibly updated) track.
    #[instrument(skip(db, dto))]
    pub async fn update_period(
        db: &PgPool,
        period_id: PeriodId,
        tenant_id: TenantId,
        dto: UpdatePeriodDto,
    ) -> Result<Period, AppError> {
        let existing = sqlx::query_as::<_, Period>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM periods WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(period_id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Period not found")))?;

        let (year_start, year_end) = year_bounds(db, existing.year_id, tenant_id).await?;

        let name = dto.name.clone().unwrap_or(existing.name);
        let sequence = dto.sequence.unwrap_or(existing.sequence);
        let track = dto.track.clone().unwrap_or(existing.track);
        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);
        let evaluation_deadline = dto.evaluation_deadline.or(existing.evaluation_deadline);
        let report_card_deadline = dto.report_card_deadline.or(existing.report_card_deadline);
        let status = dto.status.unwrap_or(existing.status);

        validate_period_range(start_date, end_date, year_start, year_end)?;

        let candidate = YearPeriodDto {
            name: name.clone(),
            sequence,
            track: track.clone(),
            start_date,
            end_date,
            evaluation_deadline,
            report_card_deadline,
            status: Some(status),
        };
        check_track_consistency(
            db,
            existing.year_id,
            year_start,
            year_end,
            &candidate,
            Some(period_id),
        )
        .await?;

        let mut tx = db.begin().await?;

        if status.is_active() {
            enforce_single_active_period(&mut tx, existing.year_id, &track, Some(period_id))
                .await?;
        }

        let period = sqlx::query_as::<_, Period>(&format!(
            r#"UPDATE periods
               SET name = $1, sequence = $2, track = $3, start_date = $4, end_date = $5,
                   evaluation_deadline = $6, report_card_deadline = $7, status = $8,
                   updated_at = NOW()
               WHERE id = $9 AND tenant_id = $10
               RETURNING {PERIOD_COLUMNS}"#
        ))
        .bind(&name)
        .bind(sequence)
        .bind(&track)
        .bind(start_date)
        .bind(end_date)
        .bind(evaluation_deadline)
        .bind(report_card_deadline)
        .bind(status)
        .bind(period_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_period_unique_violation)?;

        tx.commit().await?;

        Ok(period)
    }

    /// Delete a period.
    #[instrument(skip(db))]
    pub async fn delete_period(
        db: &PgPool,
        period_id: PeriodId,
        tenant_id: TenantId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM periods WHERE id = $1 AND tenant_id = $2")
            .bind(period_id)
            .bind(tenant_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Period not found")));
        }

        Ok(())
    }

    /// Set a period's lifecycle status.
    ///
    /// Transitioning to ACTIVE demotes the track's previously active
    /// period to COMPLETED; sibling tracks are untouched.
    #[instrument(skip(db))]
    pub async fn set_period_status(
        db: &PgPool,
        period_id: PeriodId,
        tenant_id: TenantId,
        status: LifecycleStatus,
    ) -> Result<Period, AppError> {
        let mut tx = db.begin().await?;

        let scope = sqlx::query_as::<_, (SchoolYearId, String)>(
            "SELECT year_id, track FROM periods WHERE id = $1 AND tenant_id = $2",
        )
        .bind(period_id)
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((year_id, track)) = scope else {
            return Err(AppError::not_found(anyhow::anyhow!("Period not found")));
        };

        if status.is_active() {
            enforce_single_active_period(&mut tx, year_id, &track, Some(period_id)).await?;
        }

        let period = sqlx::query_as::<_, Period>(&format!(
            r#"UPDATE periods
               SET status = $1, updated_at = NOW()
               WHERE id = $2 AND tenant_id = $3
               RETURNING {PERIOD_COLUMNS}"#
        ))
        .bind(status)
        .bind(period_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_period_unique_violation)?;

        tx.commit().await?;

        Ok(period)
    }
}
