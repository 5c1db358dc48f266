//! Pure domain layer for the Velo bicycle-sharing backend.
//!
//! No persistence or HTTP dependencies live here. The crate defines the
//! shared id/timestamp types, the domain error taxonomy, role constants,
//! and the rental lifecycle rules (duration arithmetic, reservation hold
//! expiry, business rejections).

pub mod error;
pub mod rental;
pub mod roles;
pub mod types;
