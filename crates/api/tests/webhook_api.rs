//! HTTP-level integration tests for the telemetry webhook.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, post_json, seed_bicycle, TEST_WEBHOOK_TOKEN};
use serde_json::json;
use sqlx::PgPool;
use velo_db::models::bicycle::BicycleStatus;
use velo_db::repositories::BicycleRepo;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_telemetry_updates_coordinates_only(pool: PgPool) {
    let bike = seed_bicycle(&pool, "bike101", BicycleStatus::InUse).await;
    let app = build_test_app(pool.clone());

    let response = post_json(
        app,
        "/api/v1/webhooks/telemetry",
        json!({ "device_id": "bike101", "latitude": 12.9716, "longitude": 77.5946 }),
        Some(TEST_WEBHOOK_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["latitude"], 12.9716);

    let reloaded = BicycleRepo::find_by_id(&pool, bike.id).await.unwrap().unwrap();
    assert_eq!(reloaded.latitude, Some(12.9716));
    assert_eq!(reloaded.longitude, Some(77.5946));
    // Telemetry never touches the lifecycle status.
    assert_eq!(reloaded.status, BicycleStatus::InUse);
    assert!(reloaded.last_update >= bike.last_update);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_telemetry_rejects_bad_token(pool: PgPool) {
    seed_bicycle(&pool, "bike101", BicycleStatus::Available).await;
    let app = build_test_app(pool.clone());

    let payload = json!({ "device_id": "bike101", "latitude": 1.0, "longitude": 2.0 });

    let response = post_json(app.clone(), "/api/v1/webhooks/telemetry", payload.clone(), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app,
        "/api/v1/webhooks/telemetry",
        payload,
        Some("wrong-secret"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_telemetry_unknown_device(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = post_json(
        app,
        "/api/v1/webhooks/telemetry",
        json!({ "device_id": "GHOST", "latitude": 1.0, "longitude": 2.0 }),
        Some(TEST_WEBHOOK_TOKEN),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "UNKNOWN_DEVICE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_telemetry_rejects_out_of_range_coordinates(pool: PgPool) {
    let bike = seed_bicycle(&pool, "bike101", BicycleStatus::Available).await;
    let app = build_test_app(pool.clone());

    for payload in [
        json!({ "device_id": "bike101", "latitude": 91.0, "longitude": 0.0 }),
        json!({ "device_id": "bike101", "latitude": 0.0, "longitude": -181.0 }),
        json!({ "device_id": "", "latitude": 0.0, "longitude": 0.0 }),
    ] {
        let response = post_json(
            app.clone(),
            "/api/v1/webhooks/telemetry",
            payload,
            Some(TEST_WEBHOOK_TOKEN),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Rejected payloads left the row untouched.
    let reloaded = BicycleRepo::find_by_id(&pool, bike.id).await.unwrap().unwrap();
    assert_eq!(reloaded.latitude, bike.latitude);
}
