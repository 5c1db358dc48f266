//! Rental lifecycle engine.
//!
//! Every transition here is a single database transaction: the bicycle row
//! is the authoritative lock token (`SELECT ... FOR UPDATE`), the rental
//! ledger is the derived side, and both change together or not at all.
//!
//! Failure taxonomy:
//! - business rejections ([`velo_core::rental::LifecycleError`]) are
//!   deterministic, user-facing, and never retried;
//! - contention aborts (Postgres `40001` serialization failure, `40P01`
//!   deadlock) are retried a bounded number of times before surfacing as a
//!   transient 503 -- never as a misleading business error;
//! - anything else rolls the transaction back and propagates.

pub mod lifecycle;
pub mod reservations;

use std::time::Duration;

/// Maximum transaction attempts per transition (1 initial + 2 retries).
pub(crate) const MAX_TX_ATTEMPTS: u32 = 3;

/// Base backoff between contention retries, scaled by attempt number.
pub(crate) const RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// Whether a sqlx error is a contention abort worth retrying.
///
/// `40001` = serialization_failure, `40P01` = deadlock_detected. Lock
/// *misses* (row absent / status mismatch) are business outcomes, not
/// contention, and never reach this check.
pub(crate) fn is_retryable(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01"))
        }
        _ => false,
    }
}
