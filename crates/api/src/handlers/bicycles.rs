//! Handlers for the `/bicycles` resource and its admin CRUD.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use velo_core::error::CoreError;
use velo_core::types::DbId;
use velo_db::models::bicycle::{CreateBicycle, DeleteBicycleOutcome, UpdateBicycle};
use velo_db::repositories::BicycleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/bicycles
///
/// List the whole inventory, ordered by device id.
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let bicycles = BicycleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: bicycles }))
}

/// GET /api/v1/bicycles/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let bicycle = BicycleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Bicycle",
            id,
        }))?;
    Ok(Json(DataResponse { data: bicycle }))
}

/// POST /api/v1/admin/bicycles
///
/// Register a new bicycle.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateBicycle>,
) -> AppResult<impl IntoResponse> {
    if input.device_id.trim().is_empty() {
        return Err(AppError::BadRequest("device_id must not be empty".into()));
    }

    let bicycle = BicycleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        bicycle_id = bicycle.id,
        device_id = %bicycle.device_id,
        user_id = admin.user_id,
        "Bicycle registered",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: bicycle })))
}

/// PUT /api/v1/admin/bicycles/{id}
///
/// Admin override: may touch any field, including status.
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBicycle>,
) -> AppResult<impl IntoResponse> {
    let bicycle = BicycleRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Bicycle",
            id,
        }))?;

    tracing::info!(bicycle_id = id, user_id = admin.user_id, "Bicycle updated");

    Ok(Json(DataResponse { data: bicycle }))
}

/// DELETE /api/v1/admin/bicycles/{id}
///
/// Rejected with 409 while an ongoing rental references the bicycle.
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    match BicycleRepo::delete_if_unreferenced(&state.pool, id).await? {
        DeleteBicycleOutcome::Deleted => {
            tracing::info!(bicycle_id = id, user_id = admin.user_id, "Bicycle deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        DeleteBicycleOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Bicycle",
            id,
        })),
        DeleteBicycleOutcome::HasOngoingRental => Err(AppError::Core(CoreError::Conflict(
            "Bicycle has an ongoing rental and cannot be deleted".into(),
        ))),
    }
}
