//! Route definitions for device telemetry.

use axum::routing::post;
use axum::Router;

use crate::handlers::webhooks;
use crate::state::AppState;

/// Routes mounted at `/webhooks`.
///
/// ```text
/// POST /telemetry -> GPS update (shared-secret bearer)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/telemetry", post(webhooks::telemetry))
}
