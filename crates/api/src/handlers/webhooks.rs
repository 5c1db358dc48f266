//! Telemetry webhook: GPS updates pushed by the bicycle fleet.
//!
//! Authenticated by a shared bearer secret (`WEBHOOK_TOKEN`), not by JWT:
//! the devices are not users. Telemetry only ever touches coordinates and
//! `last_update` -- never status.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use velo_core::error::CoreError;
use velo_core::rental::LifecycleError;
use velo_db::repositories::BicycleRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /webhooks/telemetry`.
#[derive(Debug, Deserialize, Validate)]
pub struct TelemetryUpdate {
    #[validate(length(min = 1))]
    pub device_id: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// POST /api/v1/webhooks/telemetry
pub async fn telemetry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<TelemetryUpdate>,
) -> AppResult<impl IntoResponse> {
    check_webhook_token(&headers, &state.config.webhook_token)?;
    input.validate().map_err(AppError::from_validation)?;

    let bicycle =
        BicycleRepo::update_location(&state.pool, &input.device_id, input.latitude, input.longitude)
            .await?
            .ok_or_else(|| LifecycleError::UnknownDevice {
                device_id: input.device_id.clone(),
            })?;

    tracing::debug!(
        device_id = %bicycle.device_id,
        latitude = input.latitude,
        longitude = input.longitude,
        "Telemetry update applied",
    );

    Ok(Json(DataResponse { data: bicycle }))
}

/// Validate the shared-secret bearer token on a webhook request.
fn check_webhook_token(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing webhook bearer token".into(),
            ))
        })?;

    if token != expected {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid webhook token".into(),
        )));
    }
    Ok(())
}
