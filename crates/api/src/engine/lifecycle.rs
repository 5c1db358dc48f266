//! Start and complete transitions of the rental state machine.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use velo_core::rental::{duration_minutes, LifecycleError};
use velo_core::types::{DbId, Timestamp};
use velo_db::models::bicycle::BicycleStatus;
use velo_db::repositories::{BicycleRepo, RentalRepo};

use super::{is_retryable, MAX_TX_ATTEMPTS, RETRY_BACKOFF};
use crate::error::AppError;

/// Result of a successful start transition.
#[derive(Debug, Clone, Serialize)]
pub struct RideStarted {
    pub rental_id: DbId,
    pub bicycle_id: DbId,
    pub device_id: String,
    pub start_time: Timestamp,
}

/// Result of a successful complete transition.
#[derive(Debug, Clone, Serialize)]
pub struct RideCompleted {
    pub rental_id: DbId,
    pub bicycle_id: DbId,
    pub duration_minutes: f64,
    pub end_time: Timestamp,
}

/// Start a ride: one atomic check-and-lock-and-write unit of work.
///
/// Among concurrent starts targeting the same bicycle exactly one acquires
/// the row lock and proceeds to `in_use`; the rest observe the status
/// mismatch and are rejected with `BicycleUnavailable` as if they had
/// arrived after the winner.
pub async fn start_ride(
    pool: &PgPool,
    user_id: DbId,
    device_id: &str,
) -> Result<RideStarted, AppError> {
    let mut attempt = 1;
    loop {
        match try_start(pool, user_id, device_id).await {
            Err(AppError::Database(err)) if is_retryable(&err) => {
                if attempt >= MAX_TX_ATTEMPTS {
                    return Err(AppError::ServiceUnavailable(format!(
                        "start_ride contention persisted after {attempt} attempts: {err}"
                    )));
                }
                tracing::warn!(
                    user_id,
                    device_id,
                    attempt,
                    error = %err,
                    "Start transaction aborted by contention, retrying",
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

async fn try_start(
    pool: &PgPool,
    user_id: DbId,
    device_id: &str,
) -> Result<RideStarted, AppError> {
    let mut tx = pool.begin().await?;

    // One active ride per user.
    if RentalRepo::has_ongoing(&mut *tx, user_id).await? {
        return Err(LifecycleError::AlreadyRiding.into());
    }

    // Check-and-lock in the same transaction as the writes below; this is
    // what closes the race where two requests both observe `available`.
    let bicycle = BicycleRepo::lock_by_device(&mut *tx, device_id, BicycleStatus::Available)
        .await?
        .ok_or_else(|| LifecycleError::BicycleUnavailable {
            device_id: device_id.to_string(),
        })?;

    let rental = RentalRepo::create_ongoing(&mut *tx, user_id, bicycle.id)
        .await
        .map_err(|e| map_ongoing_unique_violation(e, device_id))?;
    BicycleRepo::set_status(&mut *tx, bicycle.id, BicycleStatus::InUse).await?;

    tx.commit().await?;

    tracing::info!(
        user_id,
        device_id,
        rental_id = rental.id,
        bicycle_id = bicycle.id,
        "Ride started",
    );

    Ok(RideStarted {
        rental_id: rental.id,
        bicycle_id: bicycle.id,
        device_id: bicycle.device_id,
        start_time: rental.start_time,
    })
}

/// Complete the caller's own ride.
pub async fn complete_ride(
    pool: &PgPool,
    user_id: DbId,
    rental_id: DbId,
    distance_km: Option<f64>,
) -> Result<RideCompleted, AppError> {
    complete_with_owner(pool, Some(user_id), rental_id, distance_km).await
}

/// Complete a ride by rental id regardless of owner (admin override).
///
/// Routes through the exact same transaction as the user path so the
/// invariants hold under an override too.
pub async fn complete_ride_admin(
    pool: &PgPool,
    rental_id: DbId,
    distance_km: Option<f64>,
) -> Result<RideCompleted, AppError> {
    complete_with_owner(pool, None, rental_id, distance_km).await
}

async fn complete_with_owner(
    pool: &PgPool,
    owner: Option<DbId>,
    rental_id: DbId,
    distance_km: Option<f64>,
) -> Result<RideCompleted, AppError> {
    let mut attempt = 1;
    loop {
        match try_complete(pool, owner, rental_id, distance_km).await {
            Err(AppError::Database(err)) if is_retryable(&err) => {
                if attempt >= MAX_TX_ATTEMPTS {
                    return Err(AppError::ServiceUnavailable(format!(
                        "complete_ride contention persisted after {attempt} attempts: {err}"
                    )));
                }
                tracing::warn!(
                    rental_id,
                    attempt,
                    error = %err,
                    "Complete transaction aborted by contention, retrying",
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

async fn try_complete(
    pool: &PgPool,
    owner: Option<DbId>,
    rental_id: DbId,
    distance_km: Option<f64>,
) -> Result<RideCompleted, AppError> {
    let mut tx = pool.begin().await?;

    // Wrong id, wrong owner, and already-completed are indistinguishable
    // here; among concurrent completes exactly one locks the ongoing row.
    let rental = RentalRepo::lock_ongoing(&mut *tx, rental_id, owner)
        .await?
        .ok_or(LifecycleError::RentalNotFound { id: rental_id })?;

    let end_time = Utc::now();
    let minutes = duration_minutes(rental.start_time, end_time);
    let completed =
        RentalRepo::mark_completed(&mut *tx, rental.id, end_time, minutes, distance_km).await?;

    // Free the bicycle via the id captured from the locked rental row, not
    // a fresh device lookup -- no second race window.
    BicycleRepo::set_status(&mut *tx, rental.bicycle_id, BicycleStatus::Available).await?;

    tx.commit().await?;

    tracing::info!(
        rental_id = completed.id,
        bicycle_id = completed.bicycle_id,
        duration_minutes = minutes,
        "Ride completed",
    );

    Ok(RideCompleted {
        rental_id: completed.id,
        bicycle_id: completed.bicycle_id,
        duration_minutes: minutes,
        end_time,
    })
}

/// Translate a partial-unique-index violation on the ledger insert into the
/// business rejection the loser of the race would have received anyway.
pub(super) fn map_ongoing_unique_violation(err: sqlx::Error, device_id: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            match db_err.constraint() {
                Some("uq_rental_logs_user_ongoing") => {
                    return LifecycleError::AlreadyRiding.into();
                }
                Some("uq_rental_logs_bicycle_ongoing") => {
                    return LifecycleError::BicycleUnavailable {
                        device_id: device_id.to_string(),
                    }
                    .into();
                }
                _ => {}
            }
        }
    }
    AppError::Database(err)
}
