use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use scolaris_core::AppError;
use scolaris_models::ids::{PeriodId, SchoolYearId};

use crate::middleware::tenant::Tenant;
use crate::modules::periods::model::{
    CreatePeriodDto, PaginatedPeriodsResponse, Period, PeriodFilterParams, PeriodWithYearInfo,
    UpdatePeriodDto,
};
use crate::modules::periods::service::PeriodService;
use crate::modules::school_years::controller::SetStatusDto;
use crate::state::AppState;

/// Add a period to an existing school year
#[utoipa::path(
    post,
    path = "/api/periods",
    summary = "Create period",
    request_body = CreatePeriodDto,
    responses(
        (status = 201, description = "Period created successfully", body = Period),
        (status = 400, description = "Invalid input, dates outside the year, or overlap with a sibling"),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "School year not found"),
        (status = 409, description = "Sequence slot already taken in this track")
    ),
    tag = "Periods",
    security(("tenant_header" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_period(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(dto): Json<CreatePeriodDto>,
) -> Result<(StatusCode, Json<Period>), AppError> {
    dto.validate().map_err(AppError::bad_request)?;

    let period = PeriodService::create_period(&state.db, tenant_id, dto).await?;

    Ok((StatusCode::CREATED, Json(period)))
}

/// Get all periods of a school year
#[utoipa::path(
    get,
    path = "/api/school-years/{id}/periods",
    summary = "List year periods",
    params(
        ("id" = Uuid, Path, description = "School year ID"),
        PeriodFilterParams
    ),
    responses(
        (status = 200, description = "List of periods ordered by track and sequence", body = PaginatedPeriodsResponse),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "School year not found")
    ),
    tag = "Periods",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn get_year_periods(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
    Query(filters): Query<PeriodFilterParams>,
) -> Result<Json<PaginatedPeriodsResponse>, AppError> {
    let year_id = SchoolYearId::from(id);
    let periods = PeriodService::get_periods_by_year(&state.db, year_id, tenant_id, filters).await?;

    Ok(Json(periods))
}

/// Get the active periods of the tenant's active school year
#[utoipa::path(
    get,
    path = "/api/periods/active",
    summary = "Get active periods",
    responses(
        (status = 200, description = "Active periods, at most one per track", body = Vec<PeriodWithYearInfo>),
        (status = 401, description = "Missing or invalid tenant header")
    ),
    tag = "Periods",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn get_active_periods(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
) -> Result<Json<Vec<PeriodWithYearInfo>>, AppError> {
    let periods = PeriodService::get_active_periods(&state.db, tenant_id).await?;

    Ok(Json(periods))
}

/// Get a period by ID
#[utoipa::path(
    get,
    path = "/api/periods/{id}",
    summary = "Get period",
    params(
        ("id" = Uuid, Path, description = "Period ID")
    ),
    responses(
        (status = 200, description = "Period with its owning year", body = PeriodWithYearInfo),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "Period not found")
    ),
    tag = "Periods",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn get_period_by_id(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
) -> Result<Json<PeriodWithYearInfo>, AppError> {
    let period_id = PeriodId::from(id);
    let period = PeriodService::get_period_by_id(&state.db, period_id, tenant_id).await?;

    Ok(Json(period))
}

/// Update a period
#[utoipa::path(
    put,
    path = "/api/periods/{id}",
    summary = "Update period",
    params(
        ("id" = Uuid, Path, description = "Period ID")
    ),
    request_body = UpdatePeriodDto,
    responses(
        (status = 200, description = "Period updated successfully", body = Period),
        (status = 400, description = "Invalid input, dates outside the year, or overlap with a sibling"),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "Period not found"),
        (status = 409, description = "Sequence slot already taken in this track")
    ),
    tag = "Periods",
    security(("tenant_header" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_period(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdatePeriodDto>,
) -> Result<Json<Period>, AppError> {
    dto.validate().map_err(AppError::bad_request)?;

    let period_id = PeriodId::from(id);
    let period = PeriodService::update_period(&state.db, period_id, tenant_id, dto).await?;

    Ok(Json(period))
}

/// Delete a period
#[utoipa::path(
    delete,
    path = "/api/periods/{id}",
    summary = "Delete period",
    params(
        ("id" = Uuid, Path, description = "Period ID")
    ),
    responses(
        (status = 204, description = "Period deleted successfully"),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "Period not found")
    ),
    tag = "Periods",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn delete_period(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let period_id = PeriodId::from(id);
    PeriodService::delete_period(&state.db, period_id, tenant_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Change a period's lifecycle status
#[utoipa::path(
    post,
    path = "/api/periods/{id}/status",
    summary = "Set period status",
    params(
        ("id" = Uuid, Path, description = "Period ID")
    ),
    request_body = SetStatusDto,
    responses(
        (status = 200, description = "Status changed; the track's previously active period was completed", body = Period),
        (status = 401, description = "Missing or invalid tenant header"),
        (status = 404, description = "Period not found"),
        (status = 409, description = "Concurrent activation conflict")
    ),
    tag = "Periods",
    security(("tenant_header" = []))
)]
#[instrument(skip(state))]
pub async fn set_period_status(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(id): Path<Uuid>,
    Json(dto): Json<SetStatusDto>,
) -> Result<Json<Period>, AppError> {
    let period_id = PeriodId::from(id);
    let period =
        PeriodService::set_period_status(&state.db, period_id, tenant_id, dto.status).await?;

    Ok(Json(period))
}
