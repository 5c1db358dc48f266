//! HTTP-level integration tests for registration and login.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_json};
use serde_json::json;
use sqlx::PgPool;
use velo_db::repositories::UserRepo;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_creates_user_and_profile_together(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "username": "saran",
            "email": "saran@example.com",
            "password": "test-password-123",
            "rfid_tag": "RFID001"
        }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["username"], "saran");
    assert_eq!(body["data"]["user"]["role"], "rider");
    assert_eq!(body["data"]["profile"]["rfid_tag"], "RFID001");
    // The password hash never leaves the server.
    assert!(body["data"]["user"].get("password_hash").is_none());

    let user = UserRepo::find_by_username(&pool, "saran").await.unwrap().unwrap();
    let profile = UserRepo::find_profile(&pool, user.id).await.unwrap().unwrap();
    assert_eq!(profile.rfid_tag.as_deref(), Some("RFID001"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_register_rejects_duplicates_and_weak_input(pool: PgPool) {
    let app = build_test_app(pool.clone());

    let valid = json!({
        "username": "saran",
        "email": "saran@example.com",
        "password": "test-password-123"
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", valid.clone(), None).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same username again.
    let response = post_json(app.clone(), "/api/v1/auth/register", valid, None).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Short password.
    let response = post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({ "username": "arjun", "email": "arjun@example.com", "password": "short" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Bad email.
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "username": "deepa", "email": "not-an-email", "password": "test-password-123" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_returns_usable_token(pool: PgPool) {
    let app = build_test_app(pool.clone());

    post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "username": "saran",
            "email": "saran@example.com",
            "password": "test-password-123"
        }),
        None,
    )
    .await;

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": "saran", "password": "test-password-123" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let token = body["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["user"]["role"], "rider");

    // The issued token opens an authenticated endpoint.
    let response = get(app.clone(), "/api/v1/bicycles", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_rejects_wrong_credentials(pool: PgPool) {
    let app = build_test_app(pool.clone());

    post_json(
        app.clone(),
        "/api/v1/auth/register",
        json!({
            "username": "saran",
            "email": "saran@example.com",
            "password": "test-password-123"
        }),
        None,
    )
    .await;

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        json!({ "username": "saran", "password": "wrong" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown user gets the same answer.
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "username": "ghost", "password": "whatever" }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_health_endpoint_is_public(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
