use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use scolaris_core::{AppError, PaginationMeta};
use scolaris_models::ids::{SchoolYearId, TenantId};
use scolaris_models::school_years::{
    CreateSchoolYearDto, PaginatedSchoolYearsResponse, SchoolYear, SchoolYearFilterParams,
    SchoolYearWithStats, UpdateSchoolYearDto, YearPeriodDto,
};
use scolaris_models::value_types::LifecycleStatus;

use crate::modules::periods::service::{enforce_single_active_period, map_period_unique_violation};
use crate::modules::school_years::{partition, validation};

pub struct SchoolYearService;

/// Columns returned for a bare `SchoolYear` row.
const YEAR_COLUMNS: &str = "id, tenant_id, label, description, start_date, end_date, \
     requested_tracks, is_default, status, created_at, updated_at";

fn map_year_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        if db_err.message().contains("unique_year_label_per_tenant") {
            return AppError::conflict(anyhow::anyhow!(
                "A school year with this label already exists for this tenant"
            ));
        }
        if db_err.message().contains("one_active_year_per_tenant") {
            return AppError::conflict(anyhow::anyhow!(
                "Another school year was activated concurrently"
            ));
        }
        if db_err.message().contains("one_default_year_per_tenant") {
            return AppError::conflict(anyhow::anyhow!(
                "Another school year was set as default concurrently"
            ));
        }
    }
    AppError::from(e)
}

/// Demote every ACTIVE year of the tenant (except `keep`) to COMPLETED.
///
/// Idempotent; must run inside the same transaction as the write that sets
/// a year ACTIVE, and before that write so the partial unique index never
/// sees two ACTIVE rows.
pub(crate) async fn enforce_single_active_year(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: TenantId,
    keep: Option<SchoolYearId>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"UPDATE school_years
           SET status = 'COMPLETED', updated_at = NOW()
           WHERE tenant_id = $1 AND status = 'ACTIVE' AND ($2::uuid IS NULL OR id <> $2)"#,
    )
    .bind(tenant_id)
    .bind(keep.map(|k| k.0))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Clear the default flag on every year of the tenant except `keep`.
pub(crate) async fn clear_other_defaults(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: TenantId,
    keep: Option<SchoolYearId>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"UPDATE school_years
           SET is_default = FALSE, updated_at = NOW()
           WHERE tenant_id = $1 AND is_default AND ($2::uuid IS NULL OR id <> $2)"#,
    )
    .bind(tenant_id)
    .bind(keep.map(|k| k.0))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Insert a period list for a freshly created year.
async fn insert_year_periods(
    tx: &mut Transaction<'_, Postgres>,
    year_id: SchoolYearId,
    tenant_id: TenantId,
    periods: &[YearPeriodDto],
) -> Result<(), AppError> {
    for period in periods {
        sqlx::query(
            r#"INSERT INTO periods
               (year_id, tenant_id, name, sequence, track, start_date, end_date,
                evaluation_deadline, report_card_deadline, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"#,
        )
        .bind(year_id)
        .bind(tenant_id)
        .bind(&period.name)
        .bind(period.sequence)
        .bind(&period.track)
        .bind(period.start_date)
        .bind(period.end_date)
        .bind(period.evaluation_deadline)
        .bind(period.report_card_deadline)
        .bind(period.status.unwrap_or(LifecycleStatus::Upcoming))
        .execute(&mut **tx)
        .await
        .map_err(map_period_unique_violation)?;
    }

    Ok(())
}

/// Replace a year's period set with `periods`.
///
/// Rows are upserted by `(year_id, track, sequence)` so period ids survive
/// amendments; rows whose slot is absent from the new list are deleted.
async fn replace_year_periods(
    tx: &mut Transaction<'_, Postgres>,
    year_id: SchoolYearId,
    tenant_id: TenantId,
    periods: &[YearPeriodDto],
) -> Result<(), AppError> {
    let existing = sqlx::query_as::<_, (Uuid, String, i32)>(
        "SELECT id, track, sequence FROM periods WHERE year_id = $1",
    )
    .bind(year_id)
    .fetch_all(&mut **tx)
    .await?;

    let kept: std::collections::HashSet<(&str, i32)> = periods
        .iter()
        .map(|p| (p.track.as_str(), p.sequence))
        .collect();

    let stale: Vec<Uuid> = existing
        .iter()
        .filter(|(_, track, sequence)| !kept.contains(&(track.as_str(), *sequence)))
        .map(|(id, _, _)| *id)
        .collect();

    if !stale.is_empty() {
        sqlx::query("DELETE FROM periods WHERE id = ANY($1)")
            .bind(&stale)
            .execute(&mut **tx)
            .await?;
    }

    // Demote existing actives in every track the new list activates,
    // before the upserts can trip the partial unique index.
    let mut active_tracks: Vec<&str> = periods
        .iter()
        .filter(|p| p.status == Some(LifecycleStatus::Active))
        .map(|p| p.track.as_str())
        .collect();
    active_tracks.sort_unstable();
    active_tracks.dedup();
    for track in active_tracks {
        enforce_single_active_period(tx, year_id, track, None).await?;
    }

    for period in periods {
        sqlx::query(
            r#"INSERT INTO periods
               (year_id, tenant_id, name, sequence, track, start_date, end_date,
                evaluation_deadline, report_card_deadline, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               ON CONFLICT (year_id, track, sequence) DO UPDATE
               SET name = EXCLUDED.name,
                   start_date = EXCLUDED.start_date,
                   end_date = EXCLUDED.end_date,
                   evaluation_deadline = EXCLUDED.evaluation_deadline,
                   report_card_deadline = EXCLUDED.report_card_deadline,
                   status = EXCLUDED.status,
                   updated_at = NOW()"#,
        )
        .bind(year_id)
        .bind(tenant_id)
        .bind(&period.name)
        .bind(period.sequence)
        .bind(&period.track)
        .bind(period.start_date)
        .bind(period.end_date)
        .bind(period.evaluation_deadline)
        .bind(period.report_card_deadline)
        .bind(period.status.unwrap_or(LifecycleStatus::Upcoming))
        .execute(&mut **tx)
        .await
        .map_err(map_period_unique_violation)?;
    }

    Ok(())
}

impl SchoolYearService {
    /// Create a new school year.
    ///
    /// Validates the year range and any supplied period list before writing.
    /// When no explicit periods are given, the requested tracks are
    /// partitioned into generated periods. Year insert, period inserts, and
    /// status/default cascades commit atomically.
    #[instrument(skip(db, dto))]
    pub async fn create_school_year(
        db: &PgPool,
        tenant_id: TenantId,
        dto: CreateSchoolYearDto,
    ) -> Result<SchoolYear, AppError> {
        validation::validate_year_range(dto.start_date, dto.end_date)?;

        let periods = match &dto.periods {
            Some(list) if !list.is_empty() => {
                validation::validate_periods(list, dto.start_date, dto.end_date)?;
                list.clone()
            }
            _ => partition::generate_periods(
                dto.start_date,
                dto.end_date,
                dto.requested_tracks.as_deref().unwrap_or(&[]),
            ),
        };

        let status = dto.status.unwrap_or(LifecycleStatus::Upcoming);
        let is_default = dto.is_default.unwrap_or(false);

        let mut tx = db.begin().await?;

        if status.is_active() {
            enforce_single_active_year(&mut tx, tenant_id, None).await?;
        }
        if is_default {
            clear_other_defaults(&mut tx, tenant_id, None).await?;
        }

        let year = sqlx::query_as::<_, SchoolYear>(&format!(
            r#"INSERT INTO school_years
               (tenant_id, label, description, start_date, end_date, requested_tracks,
                is_default, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {YEAR_COLUMNS}"#
        ))
        .bind(tenant_id)
        .bind(&dto.label)
        .bind(&dto.description)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(dto.requested_tracks.clone().unwrap_or_default())
        .bind(is_default)
        .bind(status)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_year_unique_violation)?;

        insert_year_periods(&mut tx, year.id, tenant_id, &periods).await?;

        tx.commit().await?;

        Ok(year)
    }

    /// Get paginated school years for a tenant.
    #[instrument(skip(db))]
    pub async fn get_school_years_by_tenant(
        db: &PgPool,
        tenant_id: TenantId,
        filters: SchoolYearFilterParams,
    ) -> Result<PaginatedSchoolYearsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::new();
        if let Some(status) = filters.status {
            where_clause.push_str(&format!(" AND s.status = '{}'", status));
        }
        if let Some(is_default) = filters.is_default {
            where_clause.push_str(&format!(" AND s.is_default = {}", is_default));
        }

        let mut count_query =
            String::from("SELECT COUNT(*) FROM school_years s WHERE s.tenant_id = $1");
        count_query.push_str(&where_clause);

        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(tenant_id)
            .fetch_one(db)
            .await?;

        let mut data_query = String::from(
            r#"SELECT
                s.id, s.tenant_id, s.label, s.description, s.start_date, s.end_date,
                s.requested_tracks, s.is_default, s.status, s.created_at, s.updated_at,
                COUNT(p.id) AS period_count
               FROM school_years s
               LEFT JOIN periods p ON p.year_id = s.id
               WHERE s.tenant_id = $1"#,
        );
        data_query.push_str(&where_clause);
        data_query.push_str(
            " GROUP BY s.id, s.tenant_id, s.label, s.description, s.start_date, s.end_date, \
             s.requested_tracks, s.is_default, s.status, s.created_at, s.updated_at",
        );
        data_query.push_str(" ORDER BY s.start_date DESC");
        data_query.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset));

        let years = sqlx::query_as::<_, SchoolYearWithStats>(&data_query)
            .bind(tenant_id)
            .fetch_all(db)
            .await?;

        let has_more = offset + limit < total;

        Ok(PaginatedSchoolYearsResponse {
            data: years,
            meta: PaginationMeta {
                total,
                limit,
                offset,
                has_more,
            },
        })
    }

    /// Get a school year by ID, scoped to the tenant.
    #[instrument(skip(db))]
    pub async fn get_school_year_by_id(
        db: &PgPool,
        year_id: SchoolYearId,
        tenant_id: TenantId,
    ) -> Result<SchoolYearWithStats, AppError> {
        let year = sqlx::query_as::<_, SchoolYearWithStats>(
            r#"SELECT
                s.id, s.tenant_id, s.label, s.description, s.start_date, s.end_date,
                s.requested_tracks, s.is_default, s.status, s.created_at, s.updated_at,
                COUNT(p.id) AS period_count
               FROM school_years s
               LEFT JOIN periods p ON p.year_id = s.id
               WHERE s.id = $1 AND s.tenant_id = $2
               GROUP BY s.id, s.tenant_id, s.label, s.description, s.start_date, s.end_date,
                        s.requested_tracks, s.is_default, s.status, s.created_at, s.updated_at"#,
        )
        .bind(year_id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School year not found")))?;

        Ok(year)
    }

    /// Get the tenant's ACTIVE school year, if any.
    #[instrument(skip(db))]
    pub async fn get_active_school_year(
        db: &PgPool,
        tenant_id: TenantId,
    ) -> Result<Option<SchoolYearWithStats>, AppError> {
        let year = sqlx::query_as::<_, SchoolYearWithStats>(
            r#"SELECT
                s.id, s.tenant_id, s.label, s.description, s.start_date, s.end_date,
                s.requested_tracks, s.is_default, s.status, s.created_at, s.updated_at,
                COUNT(p.id) AS period_count
               FROM school_years s
               LEFT JOIN periods p ON p.year_id = s.id
               WHERE s.tenant_id = $1 AND s.status = 'ACTIVE'
               GROUP BY s.id, s.tenant_id, s.label, s.description, s.start_date, s.end_date,
                        s.requested_tracks, s.is_default, s.status, s.created_at, s.updated_at"#,
        )
        .bind(tenant_id)
        .fetch_optional(db)
        .await?;

        Ok(year)
    }

    /// Update a school year.
    ///
    /// When `periods` is supplied the year's period set is replaced
    /// wholesale (upsert by slot plus deletion of leftovers). Otherwise the
    /// existing periods must still fit the new date range.
    #[instrument(skip(db, dto))]
    pub async fn update_school_year(
        db: &PgPool,
        year_id: SchoolYearId,
        tenant_id: TenantId,
        dto: UpdateSchoolYearDto,
    ) -> Result<SchoolYear, AppError> {
        let existing = sqlx::query_as::<_, SchoolYear>(&format!(
            "SELECT {YEAR_COLUMNS} FROM school_years WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(year_id)
        .bind(tenant_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("School year not found")))?;

        let label = dto.label.clone().unwrap_or(existing.label);
        let description = if dto.description.is_some() {
            dto.description.clone()
        } else {
            existing.description
        };
        let start_date = dto.start_date.unwrap_or(existing.start_date);
        let end_date = dto.end_date.unwrap_or(existing.end_date);
        let requested_tracks = dto
            .requested_tracks
            .clone()
            .unwrap_or(existing.requested_tracks);
        let is_default = dto.is_default.unwrap_or(existing.is_default);
        let status = dto.status.unwrap_or(existing.status);

        validation::validate_year_range(start_date, end_date)?;

        if let Some(periods) = &dto.periods {
            validation::validate_periods(periods, start_date, end_date)?;
        } else {
            let out_of_range = sqlx::query_scalar::<_, i64>(
                r#"SELECT COUNT(*) FROM periods
                   WHERE year_id = $1 AND (start_date < $2 OR end_date > $3)"#,
            )
            .bind(year_id)
            .bind(start_date)
            .bind(end_date)
            .fetch_one(db)
            .await?;

            if out_of_range > 0 {
                return Err(AppError::bad_request(anyhow::anyhow!(
                    "Cannot update dates: {} period(s) would fall outside the new date range",
                    out_of_range
                )));
            }
        }

        let mut tx = db.begin().await?;

        if status.is_active() {
            enforce_single_active_year(&mut tx, tenant_id, Some(year_id)).await?;
        }
        if is_default {
            clear_other_defaults(&mut tx, tenant_id, Some(year_id)).await?;
        }

        let year = sqlx::query_as::<_, SchoolYear>(&format!(
            r#"UPDATE school_years
               SET label = $1, description = $2, start_date = $3, end_date = $4,
                   requested_tracks = $5, is_default = $6, status = $7, updated_at = NOW()
               WHERE id = $8 AND tenant_id = $9
               RETURNING {YEAR_COLUMNS}"#
        ))
        .bind(&label)
        .bind(&description)
        .bind(start_date)
        .bind(end_date)
        .bind(&requested_tracks)
        .bind(is_default)
        .bind(status)
        .bind(year_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_year_unique_violation)?;

        if let Some(periods) = &dto.periods {
            replace_year_periods(&mut tx, year_id, tenant_id, periods).await?;
        }

        tx.commit().await?;

        Ok(year)
    }

    /// Delete a school year; its periods cascade-delete.
    #[instrument(skip(db))]
    pub async fn delete_school_year(
        db: &PgPool,
        year_id: SchoolYearId,
        tenant_id: TenantId,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM school_years WHERE id = $1 AND tenant_id = $2")
            .bind(year_id)
            .bind(tenant_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("School year not found")));
        }

        Ok(())
    }

    /// Set a school year's lifecycle status.
    ///
    /// Transitioning to ACTIVE demotes every other ACTIVE year of the
    /// tenant to COMPLETED within the same transaction.
    #[instrument(skip(db))]
    pub async fn set_school_year_status(
        db: &PgPool,
        year_id: SchoolYearId,
        tenant_id: TenantId,
        status: LifecycleStatus,
    ) -> Result<SchoolYear, AppError> {
        let mut tx = db.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM school_years WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(year_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        if !exists {
            return Err(AppError::not_found(anyhow::anyhow!("School year not found")));
        }

        if status.is_active() {
            enforce_single_active_year(&mut tx, tenant_id, Some(year_id)).await?;
        }

        let year = sqlx::query_as::<_, SchoolYear>(&format!(
            r#"UPDATE school_years
               SET status = $1, updated_at = NOW()
               WHERE id = $2 AND tenant_id = $3
               RETURNING {YEAR_COLUMNS}"#
        ))
        .bind(status)
        .bind(year_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_year_unique_violation)?;

        tx.commit().await?;

        Ok(year)
    }

    /// Make a school year the tenant's default, clearing any previous one.
    #[instrument(skip(db))]
    pub async fn set_default_school_year(
        db: &PgPool,
        year_id: SchoolYearId,
        tenant_id: TenantId,
    ) -> Result<SchoolYear, AppError> {
        let mut tx = db.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM school_years WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(year_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        if !exists {
            return Err(AppError::not_found(anyhow::anyhow!("School year not found")));
        }

        clear_other_defaults(&mut tx, tenant_id, Some(year_id)).await?;

        let year = sqlx::query_as::<_, SchoolYear>(&format!(
            r#"UPDATE school_years
               SET is_default = TRUE, updated_at = NOW()
               WHERE id = $1 AND tenant_id = $2
               RETURNING {YEAR_COLUMNS}"#
        ))
        .bind(year_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_year_unique_violation)?;

        tx.commit().await?;

        Ok(year)
    }
}
