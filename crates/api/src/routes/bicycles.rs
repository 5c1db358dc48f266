//! Route definitions for the rider-facing bicycle inventory.

use axum::routing::get;
use axum::Router;

use crate::handlers::bicycles;
use crate::state::AppState;

/// Routes mounted at `/bicycles`.
///
/// ```text
/// GET /       -> list
/// GET /{id}   -> get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(bicycles::list))
        .route("/{id}", get(bicycles::get_by_id))
}
