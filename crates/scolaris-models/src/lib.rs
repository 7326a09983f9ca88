//! # Scolaris Models
//!
//! Domain models and DTOs for the Scolaris API.
//!
//! This crate provides the data structures of the academic calendar
//! domain: database entities, request/response DTOs, strongly-typed ids,
//! and shared value types.
//!
//! # Modules
//!
//! - [`ids`]: Strongly-typed UUID newtypes (`TenantId`, `SchoolYearId`, `PeriodId`)
//! - [`value_types`]: `LifecycleStatus` and the well-known period tracks
//! - [`school_years`]: School year entities and DTOs
//! - [`periods`]: Period entities and DTOs

pub mod ids;
pub mod periods;
pub mod school_years;
pub mod value_types;

// Re-export commonly used types at crate root for convenience
pub use value_types::{LifecycleStatus, tracks};

pub use school_years::{
    CreateSchoolYearDto, PaginatedSchoolYearsResponse, SchoolYear, SchoolYearFilterParams,
    SchoolYearWithStats, UpdateSchoolYearDto, YearPeriodDto,
};

pub use periods::{
    CreatePeriodDto, PaginatedPeriodsResponse, Period, PeriodFilterParams, PeriodWithYearInfo,
    UpdatePeriodDto,
};
