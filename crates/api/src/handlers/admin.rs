//! Admin handlers for the rental ledger.
//!
//! All endpoints require the admin role via [`RequireAdmin`]. The status
//! override routes through the engine's completion transaction -- never a
//! bare field write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use velo_core::rental::LifecycleError;
use velo_core::types::DbId;
use velo_db::models::rental::RentalStatus;
use velo_db::repositories::RentalRepo;

use crate::engine::lifecycle;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/rentals/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetRentalStatusRequest {
    pub status: String,
    pub distance_km: Option<f64>,
}

/// GET /api/v1/admin/rentals?limit=&offset=
///
/// The full rental ledger, newest first.
pub async fn list_rentals(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.clamped();
    let rentals = RentalRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: rentals }))
}

/// PUT /api/v1/admin/rentals/{id}/status
///
/// Admin override of a rental's status. Transitioning to `completed` runs
/// the same completion transaction as the rider path. Transitioning back
/// to `ongoing` is rejected: completion fields are written exactly once.
pub async fn set_rental_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(rental_id): Path<DbId>,
    Json(input): Json<SetRentalStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let status = RentalStatus::parse(&input.status).ok_or(LifecycleError::InvalidStatus {
        value: input.status.clone(),
    })?;

    match status {
        RentalStatus::Completed => {
            let completed =
                lifecycle::complete_ride_admin(&state.pool, rental_id, input.distance_km).await?;

            tracing::info!(
                rental_id,
                user_id = admin.user_id,
                "Rental force-completed by admin",
            );

            Ok(Json(DataResponse { data: completed }))
        }
        RentalStatus::Ongoing => Err(LifecycleError::InvalidStatus {
            value: input.status.clone(),
        }
        .into()),
    }
}

/// DELETE /api/v1/admin/rentals/{id}
///
/// Hard-delete a ledger row (the audit exception).
pub async fn purge_rental(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(rental_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = RentalRepo::purge(&state.pool, rental_id).await?;
    if !deleted {
        return Err(AppError::Lifecycle(LifecycleError::RentalNotFound {
            id: rental_id,
        }));
    }

    tracing::info!(rental_id, user_id = admin.user_id, "Rental purged by admin");

    Ok(StatusCode::NO_CONTENT)
}
