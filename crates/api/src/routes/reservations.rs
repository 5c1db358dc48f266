//! Route definitions for reservation holds.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reservations;
use crate::state::AppState;

/// Routes mounted at `/reservations`.
///
/// ```text
/// POST /               -> place hold
/// GET  /               -> list own
/// POST /{id}/confirm   -> promote hold to ride
/// POST /{id}/cancel    -> withdraw hold
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reservations::list).post(reservations::create))
        .route("/{id}/confirm", post(reservations::confirm))
        .route("/{id}/cancel", post(reservations::cancel))
}
