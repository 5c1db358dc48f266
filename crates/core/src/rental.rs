//! Rental lifecycle rules: business rejections, duration arithmetic, and
//! reservation hold expiry.
//!
//! The state machine itself (transactions, row locks) lives in the API
//! crate's engine; this module holds the parts that are pure functions of
//! their inputs so they can be unit-tested without a database.

use chrono::Duration;

use crate::types::{DbId, Timestamp};

/// Default reservation hold duration in minutes.
///
/// Overridable per deployment via `RESERVATION_HOLD_MINS`; the expiry is
/// always computed here at creation time, never by a column default.
pub const DEFAULT_RESERVATION_HOLD_MINS: i64 = 10;

/// Deterministic business-rule rejections produced by the lifecycle engine.
///
/// These are expected, user-facing outcomes: the caller must pick a
/// different action (another bicycle, another rental id). None of them is
/// retried and none leaves partial state behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    /// The user already has an ongoing rental.
    #[error("user already has an ongoing rental")]
    AlreadyRiding,

    /// The bicycle does not exist or is not currently available.
    ///
    /// Unknown device and status mismatch are deliberately collapsed into
    /// one rejection: the caller cannot and need not distinguish them.
    #[error("bicycle {device_id} is not available")]
    BicycleUnavailable { device_id: String },

    /// No ongoing rental matches the given id and owner.
    ///
    /// Wrong id, wrong owner, and already-completed all map here so that
    /// rental ids belonging to other users are not probeable.
    #[error("rental {id} not found")]
    RentalNotFound { id: DbId },

    /// No pending reservation matches the given id and owner.
    #[error("reservation {id} not found")]
    ReservationNotFound { id: DbId },

    /// The reservation's hold lapsed before it was confirmed.
    #[error("reservation {id} has expired")]
    ReservationExpired { id: DbId },

    /// The telemetry webhook referenced a device id with no bicycle row.
    #[error("unknown device {device_id}")]
    UnknownDevice { device_id: String },

    /// An admin override supplied a status outside the rental state machine.
    #[error("invalid rental status: {value}")]
    InvalidStatus { value: String },
}

/// Compute the committed ride duration in minutes.
///
/// Clamped at zero: a clock skew that yields `end < start` must never
/// produce a negative duration in the ledger.
pub fn duration_minutes(start: Timestamp, end: Timestamp) -> f64 {
    let minutes = (end - start).num_milliseconds() as f64 / 60_000.0;
    minutes.max(0.0)
}

/// Compute a reservation's expiry from its creation time and hold length.
pub fn hold_expiry(reserved_at: Timestamp, hold_mins: i64) -> Timestamp {
    reserved_at + Duration::minutes(hold_mins)
}
