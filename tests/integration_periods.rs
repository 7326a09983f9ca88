mod common;

use axum::http::StatusCode;
use common::{create_year, send_json, setup_test_app};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_period_in_year(pool: PgPool) {
    let app = setup_test_app(pool);
    let tenant = Uuid::new_v4();

    let year = create_year(app.clone(), tenant, "2024-2025", &[]).await;
    let year_id = year["id"].as_str().unwrap();

    let (status, body) = send_json(
        app,
        "POST",
        "/api/periods",
        Some(tenant),
        Some(json!({
            "year_id": year_id,
            "name": "Trimestre 1",
            "track": "TRIMESTER",
            "start_date": "2024-09-01",
            "end_date": "2024-12-01",
            "evaluation_deadline": "2024-11-25",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sequence"], 1);
    assert_eq!(body["status"], "UPCOMING");
    assert_eq!(body["evaluation_deadline"], "2024-11-25");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_period_outside_year_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool);
    let tenant = Uuid::new_v4();

    let year = create_year(app.clone(), tenant, "2024-2025", &[]).await;
    let year_id = year["id"].as_str().unwrap();

    let (status, body) = send_json(
        app,
        "POST",
        "/api/periods",
        Some(tenant),
        Some(json!({
            "year_id": year_id,
            "name": "Early",
            "track": "TRIMESTER",
            "start_date": "2024-07-01",
            "end_date": "2024-10-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("within"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_period_overlap_is_rejected(pool: PgPool) {
    let app = setup_test_app(pool);
    let tenant = Uuid::new_v4();

    let year = create_year(app.clone(), tenant, "2024-2025", &["TRIMESTER"]).await;
    let year_id = year["id"].as_str().unwrap();

    let (status, _) = send_json(
        app.clone(),
        "POST",
        "/api/periods",
        Some(tenant),
        Some(json!({
            "year_id": year_id,
            "name": "Overlapping",
            "track": "TRIMESTER",
            "start_date": "2024-10-01",
            "end_date": "2025-01-15",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Same span in a fresh track is accepted
    let (status, _) = send_json(
        app,
        "POST",
        "/api/periods",
        Some(tenant),
        Some(json!({
            "year_id": year_id,
            "name": "Parallel",
            "track": "SEMESTER",
            "start_date": "2024-10-01",
            "end_date": "2025-01-15",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_period_activation_stays_in_track(pool: PgPool) {
    let app = setup_test_app(pool);
    let tenant = Uuid::new_v4();

    let year = create_year(app.clone(), tenant, "2024-2025", &["TRIMESTER", "SEMESTER"]).await;
    let year_id = year["id"].as_str().unwrap();

    let (_, body) = send_json(
        app.clone(),
        "GET",
        &format!("/api/school-years/{year_id}/periods?track=TRIMESTER"),
        Some(tenant),
        None,
    )
    .await;
    let t2_id = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["sequence"] == 2)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = send_json(
        app.clone(),
        "POST",
        &format!("/api/periods/{t2_id}/status"),
        Some(tenant),
        Some(json!({ "status": "ACTIVE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(
        app,
        "GET",
        &format!("/api/school-years/{year_id}/periods"),
        Some(tenant),
        None,
    )
    .await;
    let periods = body["data"].as_array().unwrap();
    let status_of = |track: &str, sequence: i64| {
        periods
            .iter()
            .find(|p| p["track"] == track && p["sequence"] == sequence)
            .unwrap()["status"]
            .as_str()
            .unwrap()
            .to_string()
    };
    assert_eq!(status_of("TRIMESTER", 1), "COMPLETED");
    assert_eq!(status_of("TRIMESTER", 2), "ACTIVE");
    assert_eq!(status_of("SEMESTER", 1), "ACTIVE");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_active_periods_endpoint(pool: PgPool) {
    let app = setup_test_app(pool);
    let tenant = Uuid::new_v4();

    let year = create_year(app.clone(), tenant, "2024-2025", &["TRIMESTER", "SEMESTER"]).await;
    let year_id = year["id"].as_str().unwrap();

    // Nothing until the year itself goes active
    let (_, body) = send_json(app.clone(), "GET", "/api/periods/active", Some(tenant), None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    send_json(
        app.clone(),
        "POST",
        &format!("/api/school-years/{year_id}/status"),
        Some(tenant),
        Some(json!({ "status": "ACTIVE" })),
    )
    .await;

    let (_, body) = send_json(app, "GET", "/api/periods/active", Some(tenant), None).await;
    let active = body.as_array().unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0]["year_label"], "2024-2025");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_update_delete_period(pool: PgPool) {
    let app = setup_test_app(pool);
    let tenant = Uuid::new_v4();

    let year = create_year(app.clone(), tenant, "2024-2025", &["SEMESTER"]).await;
    let year_id = year["id"].as_str().unwrap();

    let (_, body) = send_json(
        app.clone(),
        "GET",
        &format!("/api/school-years/{year_id}/periods"),
        Some(tenant),
        None,
    )
    .await;
    let period_id = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send_json(
        app.clone(),
        "GET",
        &format!("/api/periods/{period_id}"),
        Some(tenant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["year_label"], "2024-2025");

    let (status, body) = send_json(
        app.clone(),
        "PUT",
        &format!("/api/periods/{period_id}"),
        Some(tenant),
        Some(json!({ "name": "Premier semestre" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Premier semestre");

    let (status, _) = send_json(
        app.clone(),
        "DELETE",
        &format!("/api/periods/{period_id}"),
        Some(tenant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_json(
        app,
        "GET",
        &format!("/api/periods/{period_id}"),
        Some(tenant),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_period_not_visible_to_other_tenant(pool: PgPool) {
    let app = setup_test_app(pool);
    let tenant = Uuid::new_v4();
    let other = Uuid::new_v4();

    let year = create_year(app.clone(), tenant, "2024-2025", &["TRIMESTER"]).await;
    let year_id = year["id"].as_str().unwrap();

    let (status, _) = send_json(
        app,
        "GET",
        &format!("/api/school-years/{year_id}/periods"),
        Some(other),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
