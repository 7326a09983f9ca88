use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::periods::model::{
    CreatePeriodDto, PaginatedPeriodsResponse, Period, PeriodFilterParams, PeriodWithYearInfo,
    UpdatePeriodDto,
};
use crate::modules::school_years::controller::SetStatusDto;
use crate::modules::school_years::model::{
    CreateSchoolYearDto, PaginatedSchoolYearsResponse, SchoolYear, SchoolYearFilterParams,
    SchoolYearWithStats, UpdateSchoolYearDto, YearPeriodDto,
};
use scolaris_core::{PaginationMeta, PaginationParams};
use scolaris_models::value_types::LifecycleStatus;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::school_years::controller::create_school_year,
        crate::modules::school_years::controller::get_school_years,
        crate::modules::school_years::controller::get_active_school_year,
        crate::modules::school_years::controller::get_school_year_by_id,
        crate::modules::school_years::controller::update_school_year,
        crate::modules::school_years::controller::delete_school_year,
        crate::modules::school_years::controller::set_school_year_status,
        crate::modules::school_years::controller::set_default_school_year,
        crate::modules::periods::controller::create_period,
        crate::modules::periods::controller::get_year_periods,
        crate::modules::periods::controller::get_active_periods,
        crate::modules::periods::controller::get_period_by_id,
        crate::modules::periods::controller::update_period,
        crate::modules::periods::controller::delete_period,
        crate::modules::periods::controller::set_period_status,
    ),
    components(
        schemas(
            SchoolYear,
            SchoolYearWithStats,
            CreateSchoolYearDto,
            UpdateSchoolYearDto,
            YearPeriodDto,
            SchoolYearFilterParams,
            PaginatedSchoolYearsResponse,
            Period,
            PeriodWithYearInfo,
            CreatePeriodDto,
            UpdatePeriodDto,
            PeriodFilterParams,
            PaginatedPeriodsResponse,
            SetStatusDto,
            LifecycleStatus,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "School Years", description = "Academic calendar school year management"),
        (name = "Periods", description = "Grading period management within school years"),
    ),
    info(
        title = "Scolaris API",
        version = "0.1.0",
        description = "Multi-tenant academic calendar service managing school years and grading periods.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "tenant_header",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Tenant-Id"))),
            );
        }
    }
}
