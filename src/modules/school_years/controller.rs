use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use scolaris_core::AppError;
use scolaris_models::ids::SchoolYearId;
use scolaris_models::value_types::LifecycleStatus;

use crate::middleware::tenant::Tenant;
use crate::modules::school_years::model::{
    CreateSchoolYearDto, PaginatedSchoolYearsResponse, SchoolYear, SchoolYearFilterParams,
    SchoolYearWithStats, UpdateSchoolYearDto,
};
use crate::modules::school_years::service::SchoolYearService;
use crate::state::AppState;

/// Request body for lifecycle status changes.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetStatusDto {
    /// The lifecycle state to transition to
    pub status: LifecycleStatus,
}

/// Create a new school year
#[utoipa::path(
    post,
    path = "/api/school-years",
    summary = "Create school year",
    request_body = CreateSchoolYearDto,
    responses(
        (status = 201, description = "School year created successfully", body = SchoolYear),
        (status = 400, description = "Invalid input or date validation failed"),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 409, description = "Duplicate label for this tenant")
    ),
    tag = "School Years",
    security(("tenant_header" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_school_year(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(dto): Json<CreateSchoolYearDto>,
) -> Result<(StatusCode, Json<SchoolYear>), AppError> {
    dto.validate().map_err(AppError::bad_request)?;

    let year = SchoolYearService::create_school_year(&state.db, tenant_id, dto).await?;

    Ok((StatusCode::CREATED, Json(year)))
}

/// Get all school years of the tenant
#[utoipa::path(
    get,
    path = "/api/school-years",
    summary = "List school years",
    params(SchoolYearFilterParams),
    responses(
        (status = 200, description = "List of school years", body = PaginatedSchoolYearsResponse),
        (status = 401, description = "Missing or invalid tenant header")
    ),
    tag = "School Years",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn get_school_years(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Query(filters): Query<SchoolYearFilterParams>,
) -> Result<Json<PaginatedSchoolYearsResponse>, AppError> {
    let years = SchoolYearService::get_school_years_by_tenant(&state.db, tenant_id, filters).await?;

    Ok(Json(years))
}

/// Get the tenant's active school year
#[utoipa::path(
    get,
    path = "/api/school-years/active",
    summary = "Get active school year",
    responses(
        (status = 200, description = "Active school year, or null", body = Option<SchoolYearWithStats>),
        (status = 401, description = "Missing or invalid tenant header")
    ),
    tag = "School Years",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn get_active_school_year(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
) -> Result<Json<Option<SchoolYearWithStats>>, AppError> {
    let year = SchoolYearService::get_active_school_year(&state.db, tenant_id).await?;

    Ok(Json(year))
}

/// Get a school year by ID
#[utoipa::path(
    get,
    path = "/api/school-years/{id}",
    summary = "Get school year",
    params(
        ("id" = Uuid, Path, description = "School year ID")
    ),
    responses(
        (status = 200, description = "School year details", body = SchoolYearWithStats),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "School year not found")
    ),
    tag = "School Years",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn get_school_year_by_id(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<SchoolYearWithStats>, AppError> {
    let year_id = SchoolYearId::from(id);
    let year = SchoolYearService::get_school_year_by_id(&state.db, year_id, tenant_id).await?;

    Ok(Json(year))
}

/// Update a school year
#[utoipa::path(
    put,
    path = "/api/school-years/{id}",
    summary = "Update school year",
    params(
        ("id" = Uuid, Path, description = "School year ID")
    ),
    request_body = UpdateSchoolYearDto,
    responses(
        (status = 200, description = "School year updated successfully", body = SchoolYear),
        (status = 400, description = "Invalid input or date validation failed"),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "School year not found"),
        (status = 409, description = "Duplicate label for this tenant")
    ),
    tag = "School Years",
    security(("tenant_header" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_school_year(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateSchoolYearDto>,
) -> Result<Json<SchoolYear>, AppError> {
    dto.validate().map_err(AppError::bad_request)?;

    let year_id = SchoolYearId::from(id);
    let year = SchoolYearService::update_school_year(&state.db, year_id, tenant_id, dto).await?;

    Ok(Json(year))
}

/// Delete a school year and all its periods
#[utoipa::path(
    delete,
    path = "/api/school-years/{id}",
    summary = "Delete school year",
    params(
        ("id" = Uuid, Path, description = "School year ID")
    ),
    responses(
        (status = 204, description = "School year deleted successfully"),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "School year not found")
    ),
    tag = "School Years",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn delete_school_year(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let year_id = SchoolYearId::from(id);
    SchoolYearService::delete_school_year(&state.db, year_id, tenant_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Change a school year's lifecycle status
#[utoipa::path(
    post,
    path = "/api/school-years/{id}/status",
    summary = "Set school year status",
    params(
        ("id" = Uuid, Path, description = "School year ID")
    ),
    request_body = SetStatusDto,
    responses(
        (status = 200, description = "Status changed; any previously active year was completed", body = SchoolYear),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "School year not found"),
        (status = 409, description = "Concurrent activation conflict")
    ),
    tag = "School Years",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn set_school_year_status(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
    Json(dto): Json<SetStatusDto>,
) -> Result<Json<SchoolYear>, AppError> {
    let year_id = SchoolYearId::from(id);
    let year =
        SchoolYearService::set_school_year_status(&state.db, year_id, tenant_id, dto.status)
            .await?;

    Ok(Json(year))
}

/// Make a school year the tenant's default
#[utoipa::path(
    post,
    path = "/api/school-years/{id}/default",
    summary = "Set default school year",
    params(
        ("id" = Uuid, Path, description = "School year ID")
    ),
    responses(
        (status = 200, description = "Year is now the default; any previous default was cleared", body = SchoolYear),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "School year not found")
    ),
    tag = "School Years",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn set_default_school_year(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<SchoolYear>, AppError> {
    let year_id = SchoolYearId::from(id);
    let year = SchoolYearService::set_default_school_year(&state.db, year_id, tenant_id).await?;

    Ok(Json(year))
}
