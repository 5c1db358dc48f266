//! Route definitions for the rental lifecycle.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::rentals;
use crate::state::AppState;

/// Routes mounted at `/rentals`.
///
/// ```text
/// POST /start    -> start a ride
/// POST /complete -> complete own ride
/// GET  /         -> own history
/// GET  /active   -> own ongoing ride
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(rentals::list))
        .route("/active", get(rentals::active))
        .route("/start", post(rentals::start))
        .route("/complete", post(rentals::complete))
}
