use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_school_year, delete_school_year, get_active_school_year, get_school_year_by_id,
    get_school_years, set_default_school_year, set_school_year_status, update_school_year,
};
use crate::modules::periods::controller::get_year_periods;

/// Initialize the school years router
/// Routes: POST /, GET /, GET /active, GET /{id}, PUT /{id}, DELETE /{id},
/// POST /{id}/status, POST /{id}/default, GET /{id}/periods
pub fn init_school_years_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_school_year).get(get_school_years))
        .route("/active", get(get_active_school_year))
        .route(
            "/{id}",
            get(get_school_year_by_id)
                .put(update_school_year)
                .delete(delete_school_year),
        )
        .route("/{id}/status", post(set_school_year_status))
        .route("/{id}/default", post(set_default_school_year))
        .route("/{id}/periods", get(get_year_periods))
}
