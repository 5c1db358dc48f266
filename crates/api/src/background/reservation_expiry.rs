//! Periodic sweep of lapsed reservation holds.
//!
//! Marks due `pending` reservations as `expired` and frees their bicycles.
//! The sweep is a safety net, not the source of truth: `confirm` already
//! checks expiry at decision time, so the invariant holds even if a tick
//! is late. Runs on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use velo_db::repositories::ReservationRepo;

/// Run the reservation expiry sweep loop.
///
/// Sweeps every `sweep_interval` until `cancel` is triggered.
pub async fn run(pool: PgPool, sweep_interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = sweep_interval.as_secs(),
        "Reservation expiry sweep started"
    );

    let mut interval = tokio::time::interval(sweep_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Reservation expiry sweep stopping");
                break;
            }
            _ = interval.tick() => {
                match ReservationRepo::expire_due(&pool).await {
                    Ok(expired) => {
                        if expired > 0 {
                            tracing::info!(expired, "Expiry sweep: reclaimed lapsed holds");
                        } else {
                            tracing::debug!("Expiry sweep: nothing due");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Expiry sweep failed");
                    }
                }
            }
        }
    }
}
