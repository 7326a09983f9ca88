//! School year domain models and DTOs.
//!
//! A school year is the top-level academic calendar record a tenant
//! manages, bounded by a start/end date and subdivided into grading
//! periods. A year may host periods from several parallel tracks
//! (e.g. a trimester track and a semester track over the same span),
//! but only one year per tenant can be ACTIVE and only one can be the
//! default.

use crate::ids::{SchoolYearId, TenantId};
use crate::value_types::LifecycleStatus;
use chrono::{DateTime, NaiveDate, Utc};
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// School year entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SchoolYear {
    /// Unique identifier for the school year
    pub id: SchoolYearId,
    /// Tenant this year belongs to
    pub tenant_id: TenantId,
    /// Label of the year (e.g. "2025-2026")
    pub label: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// First day of the year
    pub start_date: NaiveDate,
    /// Last day of the year
    pub end_date: NaiveDate,
    /// Track identifiers requested at creation (e.g. ["TRIMESTER"])
    pub requested_tracks: Vec<String>,
    /// Whether this is the tenant's default year (at most one)
    pub is_default: bool,
    /// Lifecycle state (at most one ACTIVE year per tenant)
    pub status: LifecycleStatus,
    /// Timestamp when the year was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the year was last updated
    pub updated_at: DateTime<Utc>,
}

/// School year with its period count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SchoolYearWithStats {
    /// Unique identifier for the school year
    pub id: SchoolYearId,
    /// Tenant this year belongs to
    pub tenant_id: TenantId,
    /// Label of the year
    pub label: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// First day of the year
    pub start_date: NaiveDate,
    /// Last day of the year
    pub end_date: NaiveDate,
    /// Track identifiers requested at creation
    pub requested_tracks: Vec<String>,
    /// Whether this is the tenant's default year
    pub is_default: bool,
    /// Lifecycle state
    pub status: LifecycleStatus,
    /// Number of periods across all tracks
    pub period_count: i64,
    /// Timestamp when the year was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the year was last updated
    pub updated_at: DateTime<Utc>,
}

/// A period supplied inline when creating or updating a school year.
///
/// The same shape is produced by the partition generator when no explicit
/// period list is given. A supplied list may mark at most one period per
/// track ACTIVE; a second ACTIVE in the same track is rejected with
/// 409 Conflict rather than demoted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct YearPeriodDto {
    /// Name of the period (e.g. "Trimestre 1")
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// 1-based position within its track
    #[validate(range(min = 1))]
    pub sequence: i32,
    /// Track this period belongs to (e.g. "TRIMESTER")
    #[validate(length(min = 1, max = 50))]
    pub track: String,
    /// First day of the period
    pub start_date: NaiveDate,
    /// Last day of the period
    pub end_date: NaiveDate,
    /// Optional deadline for entering evaluations
    pub evaluation_deadline: Option<NaiveDate>,
    /// Optional deadline for issuing report cards
    pub report_card_deadline: Option<NaiveDate>,
    /// Lifecycle state (defaults to UPCOMING)
    pub status: Option<LifecycleStatus>,
}

/// DTO for creating a new school year.
///
/// Exactly one source of periods applies: an explicit `periods` list, or
/// `requested_tracks` from which periods are generated. When both are
/// absent the year is created without periods.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSchoolYearDto {
    /// Label of the year (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub label: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// First day of the year
    pub start_date: NaiveDate,
    /// Last day of the year (90-548 days after start_date)
    pub end_date: NaiveDate,
    /// Tracks to generate periods for (ignored when `periods` is supplied)
    pub requested_tracks: Option<Vec<String>>,
    /// Explicit period list (validated against the year range)
    #[validate(nested)]
    pub periods: Option<Vec<YearPeriodDto>>,
    /// Make this the tenant's default year (clears any previous default)
    pub is_default: Option<bool>,
    /// Initial lifecycle state (defaults to UPCOMING)
    pub status: Option<LifecycleStatus>,
}

/// DTO for updating an existing school year.
///
/// When `periods` is supplied the year's period set is replaced wholesale:
/// rows are upserted by `(track, sequence)` and rows absent from the new
/// list are deleted.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSchoolYearDto {
    /// Updated label (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub label: Option<String>,
    /// Updated description
    pub description: Option<String>,
    /// Updated first day
    pub start_date: Option<NaiveDate>,
    /// Updated last day
    pub end_date: Option<NaiveDate>,
    /// Updated requested tracks (stored, never re-generates periods)
    pub requested_tracks: Option<Vec<String>>,
    /// Replacement period list
    #[validate(nested)]
    pub periods: Option<Vec<YearPeriodDto>>,
    /// Updated default flag (true clears any previous default)
    pub is_default: Option<bool>,
    /// Updated lifecycle state (ACTIVE demotes the previously active year)
    pub status: Option<LifecycleStatus>,
}

/// Query parameters for filtering school years.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct SchoolYearFilterParams {
    /// Filter by lifecycle state
    pub status: Option<LifecycleStatus>,
    /// Filter by default flag
    pub is_default: Option<bool>,
    /// Pagination parameters
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Paginated response containing school years.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedSchoolYearsResponse {
    /// List of school years
    pub data: Vec<SchoolYearWithStats>,
    /// Pagination metadata
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_dto() -> CreateSchoolYearDto {
        CreateSchoolYearDto {
            label: "2025-2026".to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            requested_tracks: Some(vec!["TRIMESTER".to_string()]),
            periods: None,
            is_default: None,
            status: None,
        }
    }

    #[test]
    fn test_create_dto_validation() {
        assert!(base_dto().validate().is_ok());

        let mut empty_label = base_dto();
        empty_label.label = String::new();
        assert!(empty_label.validate().is_err());

        let mut long_label = base_dto();
        long_label.label = "x".repeat(101);
        assert!(long_label.validate().is_err());
    }

    #[test]
    fn test_nested_period_validation() {
        let mut dto = base_dto();
        dto.requested_tracks = None;
        dto.periods = Some(vec![YearPeriodDto {
            name: String::new(),
            sequence: 0,
            track: "TRIMESTER".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            evaluation_deadline: None,
            report_card_deadline: None,
            status: None,
        }]);
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_dto_allows_empty() {
        let dto = UpdateSchoolYearDto {
            label: None,
            description: None,
            start_date: None,
            end_date: None,
            requested_tracks: None,
            periods: None,
            is_default: None,
            status: None,
        };
        assert!(dto.validate().is_ok());
    }
}
