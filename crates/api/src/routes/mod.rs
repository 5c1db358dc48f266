//! Route definitions.
//!
//! Route hierarchy under `/api/v1`:
//!
//! ```text
//! /auth/register                          register (public)
//! /auth/login                             login (public)
//!
//! /bicycles                               list (auth required)
//! /bicycles/{id}                          detail (auth required)
//!
//! /rentals/start                          start a ride (POST)
//! /rentals/complete                       complete own ride (POST)
//! /rentals                                own ride history (GET)
//! /rentals/active                         own ongoing ride (GET)
//!
//! /reservations                           place hold (POST), list own (GET)
//! /reservations/{id}/confirm              promote hold to ride (POST)
//! /reservations/{id}/cancel               withdraw hold (POST)
//!
//! /admin/bicycles                         register bicycle (admin only)
//! /admin/bicycles/{id}                    update, delete
//! /admin/rentals                          full ledger (GET)
//! /admin/rentals/{id}/status              status override (PUT)
//! /admin/rentals/{id}                     purge (DELETE)
//!
//! /webhooks/telemetry                     GPS update (shared-secret bearer)
//! ```

pub mod admin;
pub mod auth;
pub mod bicycles;
pub mod health;
pub mod rentals;
pub mod reservations;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication (register, login).
        .nest("/auth", auth::router())
        // Inventory, read-only for riders.
        .nest("/bicycles", bicycles::router())
        // Rental lifecycle + history.
        .nest("/rentals", rentals::router())
        // Reservation holds.
        .nest("/reservations", reservations::router())
        // Admin: inventory CRUD and ledger overrides.
        .nest("/admin", admin::router())
        // Device telemetry.
        .nest("/webhooks", webhooks::router())
}
