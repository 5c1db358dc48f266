//! Shared helpers for HTTP-level integration tests.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the router
//! built by [`velo_api::router::build_app_router`], so tests exercise the
//! same middleware stack that production uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use velo_api::auth::jwt::{generate_access_token, JwtConfig};
use velo_api::auth::password::hash_password;
use velo_api::config::ServerConfig;
use velo_api::router::build_app_router;
use velo_api::state::AppState;
use velo_core::roles::{ROLE_ADMIN, ROLE_RIDER};
use velo_db::models::bicycle::{Bicycle, BicycleStatus, CreateBicycle};
use velo_db::models::user::{CreateUser, User};
use velo_db::repositories::{BicycleRepo, UserRepo};

/// Bearer token the test webhook requests must present.
pub const TEST_WEBHOOK_TOKEN: &str = "test-webhook-secret";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
        },
        webhook_token: TEST_WEBHOOK_TOKEN.to_string(),
        reservation_hold_mins: 10,
        reservation_sweep_secs: 60,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, path: &str, token: Option<&str>) -> Response<Body> {
    send(app, "GET", path, token, None).await
}

pub async fn post_json(
    app: Router,
    path: &str,
    body: Value,
    token: Option<&str>,
) -> Response<Body> {
    send(app, "POST", path, token, Some(body)).await
}

pub async fn put_json(
    app: Router,
    path: &str,
    body: Value,
    token: Option<&str>,
) -> Response<Body> {
    send(app, "PUT", path, token, Some(body)).await
}

pub async fn delete(app: Router, path: &str, token: Option<&str>) -> Response<Body> {
    send(app, "DELETE", path, token, None).await
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Create a user with the given role and return it with a valid token.
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> (User, String) {
    let create = CreateUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: hash_password("test-password-123").unwrap(),
        role: role.to_string(),
    };
    let (user, _profile) = UserRepo::create_with_profile(pool, &create, None)
        .await
        .unwrap();
    let token = generate_access_token(user.id, role, &test_config().jwt).unwrap();
    (user, token)
}

pub async fn seed_rider(pool: &PgPool, username: &str) -> (User, String) {
    seed_user(pool, username, ROLE_RIDER).await
}

pub async fn seed_admin(pool: &PgPool, username: &str) -> (User, String) {
    seed_user(pool, username, ROLE_ADMIN).await
}

/// Register a bicycle in the given status.
pub async fn seed_bicycle(pool: &PgPool, device_id: &str, status: BicycleStatus) -> Bicycle {
    BicycleRepo::create(
        pool,
        &CreateBicycle {
            device_id: device_id.to_string(),
            status: Some(status),
            latitude: Some(12.8418),
            longitude: Some(80.1532),
        },
    )
    .await
    .unwrap()
}

/// Shift a rental's start time into the past to simulate ride duration.
pub async fn backdate_rental_start(pool: &PgPool, rental_id: i64, minutes: i64) {
    sqlx::query(
        "UPDATE rental_logs
         SET start_time = start_time - ($2 || ' minutes')::interval
         WHERE id = $1",
    )
    .bind(rental_id)
    .bind(minutes.to_string())
    .execute(pool)
    .await
    .unwrap();
}

/// Shift a reservation's expiry into the past to simulate a lapsed hold.
pub async fn backdate_reservation_expiry(pool: &PgPool, reservation_id: i64, minutes: i64) {
    sqlx::query(
        "UPDATE reservations
         SET expiry_at = expiry_at - ($2 || ' minutes')::interval
         WHERE id = $1",
    )
    .bind(reservation_id)
    .bind(minutes.to_string())
    .execute(pool)
    .await
    .unwrap();
}
