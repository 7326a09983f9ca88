//! Period domain models and DTOs.
//!
//! A period is a sub-interval of a school year used for grading cycles
//! (e.g. "Trimestre 1"). Periods are partitioned into independent tracks;
//! within a `(year, track)` group they must not overlap and at most one
//! may be ACTIVE.

use crate::ids::{PeriodId, SchoolYearId, TenantId};
use crate::value_types::LifecycleStatus;
use chrono::{DateTime, NaiveDate, Utc};
use scolaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Period entity.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Period {
    /// Unique identifier for the period
    pub id: PeriodId,
    /// School year this period belongs to
    pub year_id: SchoolYearId,
    /// Tenant this period belongs to
    pub tenant_id: TenantId,
    /// Name of the period (e.g. "Trimestre 1")
    pub name: String,
    /// 1-based position within its track
    pub sequence: i32,
    /// Track this period belongs to (e.g. "TRIMESTER")
    pub track: String,
    /// First day of the period
    pub start_date: NaiveDate,
    /// Last day of the period
    pub end_date: NaiveDate,
    /// Optional deadline for entering evaluations
    pub evaluation_deadline: Option<NaiveDate>,
    /// Optional deadline for issuing report cards
    pub report_card_deadline: Option<NaiveDate>,
    /// Lifecycle state (at most one ACTIVE per (year, track))
    pub status: LifecycleStatus,
    /// Timestamp when the period was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the period was last updated
    pub updated_at: DateTime<Utc>,
}

/// Period with information about its owning year.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PeriodWithYearInfo {
    /// Unique identifier for the period
    pub id: PeriodId,
    /// School year this period belongs to
    pub year_id: SchoolYearId,
    /// Tenant this period belongs to
    pub tenant_id: TenantId,
    /// Name of the period
    pub name: String,
    /// 1-based position within its track
    pub sequence: i32,
    /// Track this period belongs to
    pub track: String,
    /// First day of the period
    pub start_date: NaiveDate,
    /// Last day of the period
    pub end_date: NaiveDate,
    /// Optional deadline for entering evaluations
    pub evaluation_deadline: Option<NaiveDate>,
    /// Optional deadline for issuing report cards
    pub report_card_deadline: Option<NaiveDate>,
    /// Lifecycle state
    pub status: LifecycleStatus,
    /// Label of the owning year
    pub year_label: String,
    /// First day of the owning year
    pub year_start_date: NaiveDate,
    /// Last day of the owning year
    pub year_end_date: NaiveDate,
    /// Lifecycle state of the owning year
    pub year_status: LifecycleStatus,
    /// Timestamp when the period was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the period was last updated
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new period.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePeriodDto {
    /// School year the period belongs to
    pub year_id: SchoolYearId,
    /// Name of the period (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// 1-based position within its track (next free slot if omitted)
    #[validate(range(min = 1))]
    pub sequence: Option<i32>,
    /// Track this period belongs to (e.g. "TRIMESTER")
    #[validate(length(min = 1, max = 50))]
    pub track: String,
    /// First day of the period
    pub start_date: NaiveDate,
    /// Last day of the period (must be after start_date)
    pub end_date: NaiveDate,
    /// Optional deadline for entering evaluations
    pub evaluation_deadline: Option<NaiveDate>,
    /// Optional deadline for issuing report cards
    pub report_card_deadline: Option<NaiveDate>,
    /// Initial lifecycle state (defaults to UPCOMING)
    pub status: Option<LifecycleStatus>,
}

/// DTO for updating an existing period.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdatePeriodDto {
    /// Updated name (1-100 characters)
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// Updated position within its track
    #[validate(range(min = 1))]
    pub sequence: Option<i32>,
    /// Updated track
    #[validate(length(min = 1, max = 50))]
    pub track: Option<String>,
    /// Updated first day
    pub start_date: Option<NaiveDate>,
    /// Updated last day
    pub end_date: Option<NaiveDate>,
    /// Updated evaluation deadline
    pub evaluation_deadline: Option<NaiveDate>,
    /// Updated report card deadline
    pub report_card_deadline: Option<NaiveDate>,
    /// Updated lifecycle state (ACTIVE demotes the track's active period)
    pub status: Option<LifecycleStatus>,
}

/// Query parameters for filtering periods.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct PeriodFilterParams {
    /// Filter by track
    pub track: Option<String>,
    /// Filter by lifecycle state
    pub status: Option<LifecycleStatus>,
    /// Pagination parameters
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Paginated response containing periods.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedPeriodsResponse {
    /// List of periods
    pub data: Vec<Period>,
    /// Pagination metadata
    pub meta: PaginationMeta,
}
