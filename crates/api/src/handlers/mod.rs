//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers resolve the authorization context via extractors, delegate to
//! the lifecycle engine or the repositories in `velo_db`, and map errors
//! via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod admin;
pub mod auth;
pub mod bicycles;
pub mod rentals;
pub mod reservations;
pub mod webhooks;
