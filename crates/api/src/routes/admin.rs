//! Route definitions for admin inventory CRUD and ledger overrides.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin, bicycles};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// POST   /bicycles              -> register bicycle
/// PUT    /bicycles/{id}         -> update bicycle
/// DELETE /bicycles/{id}         -> delete bicycle (guarded)
/// GET    /rentals               -> full ledger
/// PUT    /rentals/{id}/status   -> status override
/// DELETE /rentals/{id}          -> purge ledger row
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bicycles", post(bicycles::create))
        .route(
            "/bicycles/{id}",
            put(bicycles::update).delete(bicycles::delete),
        )
        .route("/rentals", get(admin::list_rentals))
        .route("/rentals/{id}/status", put(admin::set_rental_status))
        .route("/rentals/{id}", delete(admin::purge_rental))
}
