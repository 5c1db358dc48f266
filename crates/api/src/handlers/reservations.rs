//! Handlers for the `/reservations` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use velo_core::types::DbId;
use velo_db::repositories::ReservationRepo;

use crate::engine::reservations;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /reservations`.
#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub device_id: String,
}

/// POST /api/v1/reservations
///
/// Place a hold on an available bicycle. The hold duration comes from
/// server configuration (`RESERVATION_HOLD_MINS`).
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReservationRequest>,
) -> AppResult<impl IntoResponse> {
    if input.device_id.trim().is_empty() {
        return Err(AppError::BadRequest("device_id must not be empty".into()));
    }

    let reservation = reservations::reserve(
        &state.pool,
        user.user_id,
        input.device_id.trim(),
        state.config.reservation_hold_mins,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: reservation })))
}

/// POST /api/v1/reservations/{id}/confirm
///
/// Promote the hold into a ride. Consumes the reservation.
pub async fn confirm(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let started = reservations::confirm(&state.pool, user.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: started })))
}

/// POST /api/v1/reservations/{id}/cancel
pub async fn cancel(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let cancelled = reservations::cancel(&state.pool, user.user_id, id).await?;
    Ok(Json(DataResponse { data: cancelled }))
}

/// GET /api/v1/reservations
///
/// The caller's reservations, newest first (kept for audit, all statuses).
pub async fn list(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reservations = ReservationRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: reservations }))
}
