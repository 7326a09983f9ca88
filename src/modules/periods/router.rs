use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_period, delete_period, get_active_periods, get_period_by_id, set_period_status,
    update_period,
};

/// Initialize the periods router
/// Routes: POST /, GET /active, GET /{id}, PUT /{id}, DELETE /{id},
/// POST /{id}/status
pub fn init_periods_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_period))
        .route("/active", get(get_active_periods))
        .route(
            "/{id}",
            get(get_period_by_id).put(update_period).delete(delete_period),
        )
        .route("/{id}/status", post(set_period_status))
}
