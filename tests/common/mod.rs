use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use scolaris::config::cors::CorsConfig;
use scolaris::config::server::ServerConfig;
use scolaris::router::init_router;
use scolaris::state::AppState;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub fn setup_test_app(pool: PgPool) -> axum::Router {
    let state = AppState {
        db: pool,
        cors_config: CorsConfig::default(),
        server_config: ServerConfig::default(),
    };
    init_router(state)
}

/// Send a JSON request as a tenant and return status plus parsed body.
/// Pass `tenant: None` to omit the X-Tenant-Id header.
#[allow(dead_code)]
pub async fn send_json(
    app: axum::Router,
    method: &str,
    uri: &str,
    tenant: Option<Uuid>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(tenant) = tenant {
        builder = builder.header("x-tenant-id", tenant.to_string());
    }

    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };
    let request = builder.body(body).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Create a school year over HTTP and return its JSON representation.
#[allow(dead_code)]
pub async fn create_year(
    app: axum::Router,
    tenant: Uuid,
    label: &str,
    tracks: &[&str],
) -> serde_json::Value {
    let (status, body) = send_json(
        app,
        "POST",
        "/api/school-years",
        Some(tenant),
        Some(serde_json::json!({
            "label": label,
            "start_date": "2024-09-01",
            "end_date": "2025-06-30",
            "requested_tracks": tracks,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create year failed: {body}");
    body
}
