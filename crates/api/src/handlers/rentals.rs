//! Handlers for the `/rentals` resource: the rider-facing side of the
//! lifecycle engine plus ride history.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use velo_db::repositories::RentalRepo;

use crate::engine::lifecycle;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /rentals/start`.
#[derive(Debug, Deserialize)]
pub struct StartRideRequest {
    pub device_id: String,
}

/// Request body for `POST /rentals/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteRideRequest {
    pub rental_id: i64,
    pub distance_km: Option<f64>,
}

/// POST /api/v1/rentals/start
///
/// Start a ride on an available bicycle.
pub async fn start(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<StartRideRequest>,
) -> AppResult<impl IntoResponse> {
    if input.device_id.trim().is_empty() {
        return Err(AppError::BadRequest("device_id must not be empty".into()));
    }

    let started = lifecycle::start_ride(&state.pool, user.user_id, input.device_id.trim()).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: started })))
}

/// POST /api/v1/rentals/complete
///
/// Complete the caller's ongoing ride.
pub async fn complete(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CompleteRideRequest>,
) -> AppResult<impl IntoResponse> {
    let completed = lifecycle::complete_ride(
        &state.pool,
        user.user_id,
        input.rental_id,
        input.distance_km,
    )
    .await?;
    Ok(Json(DataResponse { data: completed }))
}

/// GET /api/v1/rentals?limit=&offset=
///
/// The caller's ride history, newest first.
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.clamped();
    let rentals = RentalRepo::list_for_user(&state.pool, user.user_id, limit, offset).await?;
    Ok(Json(DataResponse { data: rentals }))
}

/// GET /api/v1/rentals/active
///
/// The caller's ongoing ride, or `null`.
pub async fn active(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rental = RentalRepo::find_ongoing_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: rental }))
}
