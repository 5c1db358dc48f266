//! Reservation sub-state-machine: `pending` holds that either promote to a
//! ride (`confirm`), are withdrawn (`cancel`), or lapse (`expired`).
//!
//! A pending hold parks its bicycle in the `reserved` status, so the start
//! transition's `available`-only match excludes it without any extra check.
//! Expiry is passive: `confirm` evaluates the hold at decision time, and
//! the periodic sweep (`ReservationRepo::expire_due`) reclaims whatever
//! nobody touched.

use chrono::Utc;
use sqlx::PgPool;
use velo_core::rental::{hold_expiry, LifecycleError};
use velo_core::types::DbId;
use velo_db::models::bicycle::BicycleStatus;
use velo_db::models::reservation::{Reservation, ReservationStatus};
use velo_db::repositories::{BicycleRepo, RentalRepo, ReservationRepo};

use super::lifecycle::RideStarted;
use super::{is_retryable, MAX_TX_ATTEMPTS, RETRY_BACKOFF};
use crate::error::AppError;

/// Place a hold on an available bicycle.
///
/// `hold_mins` is an explicit parameter resolved from configuration at the
/// boundary; the expiry timestamp is computed here, not by the database.
pub async fn reserve(
    pool: &PgPool,
    user_id: DbId,
    device_id: &str,
    hold_mins: i64,
) -> Result<Reservation, AppError> {
    let mut attempt = 1;
    loop {
        match try_reserve(pool, user_id, device_id, hold_mins).await {
            Err(AppError::Database(err)) if is_retryable(&err) => {
                if attempt >= MAX_TX_ATTEMPTS {
                    return Err(AppError::ServiceUnavailable(format!(
                        "reserve contention persisted after {attempt} attempts: {err}"
                    )));
                }
                tracing::warn!(
                    user_id,
                    device_id,
                    attempt,
                    error = %err,
                    "Reserve transaction aborted by contention, retrying",
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

async fn try_reserve(
    pool: &PgPool,
    user_id: DbId,
    device_id: &str,
    hold_mins: i64,
) -> Result<Reservation, AppError> {
    let mut tx = pool.begin().await?;

    let bicycle = BicycleRepo::lock_by_device(&mut *tx, device_id, BicycleStatus::Available)
        .await?
        .ok_or_else(|| LifecycleError::BicycleUnavailable {
            device_id: device_id.to_string(),
        })?;

    let expiry_at = hold_expiry(Utc::now(), hold_mins);
    let reservation = ReservationRepo::create_pending(&mut *tx, user_id, bicycle.id, expiry_at)
        .await
        .map_err(|e| map_pending_unique_violation(e, device_id))?;
    BicycleRepo::set_status(&mut *tx, bicycle.id, BicycleStatus::Reserved).await?;

    tx.commit().await?;

    tracing::info!(
        user_id,
        device_id,
        reservation_id = reservation.id,
        expiry_at = %expiry_at,
        "Bicycle reserved",
    );

    Ok(reservation)
}

/// Confirm a pending hold, promoting it into the start transition.
///
/// The promotion consumes the reservation: on success the hold is
/// `confirmed`, the bicycle is `in_use`, and an ongoing ledger row exists,
/// all from one transaction.
pub async fn confirm(
    pool: &PgPool,
    user_id: DbId,
    reservation_id: DbId,
) -> Result<RideStarted, AppError> {
    let mut attempt = 1;
    loop {
        match try_confirm(pool, user_id, reservation_id).await {
            Err(AppError::Database(err)) if is_retryable(&err) => {
                if attempt >= MAX_TX_ATTEMPTS {
                    return Err(AppError::ServiceUnavailable(format!(
                        "confirm contention persisted after {attempt} attempts: {err}"
                    )));
                }
                tracing::warn!(
                    user_id,
                    reservation_id,
                    attempt,
                    error = %err,
                    "Confirm transaction aborted by contention, retrying",
                );
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

async fn try_confirm(
    pool: &PgPool,
    user_id: DbId,
    reservation_id: DbId,
) -> Result<RideStarted, AppError> {
    let mut tx = pool.begin().await?;

    let reservation = ReservationRepo::lock_pending(&mut *tx, reservation_id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound { id: reservation_id })?;

    // Lazy expiry at decision time: mark the hold expired, free the
    // bicycle, and commit that outcome before rejecting.
    if !reservation.is_active(Utc::now()) {
        ReservationRepo::set_status(&mut *tx, reservation.id, ReservationStatus::Expired).await?;
        if let Some(bicycle) =
            BicycleRepo::lock_by_id(&mut *tx, reservation.bicycle_id, BicycleStatus::Reserved)
                .await?
        {
            BicycleRepo::set_status(&mut *tx, bicycle.id, BicycleStatus::Available).await?;
        }
        tx.commit().await?;
        tracing::info!(
            user_id,
            reservation_id,
            "Reservation had lapsed at confirmation time",
        );
        return Err(LifecycleError::ReservationExpired { id: reservation_id }.into());
    }

    // The promotion is a start transition: same one-ride-per-user rule.
    if RentalRepo::has_ongoing(&mut *tx, user_id).await? {
        return Err(LifecycleError::AlreadyRiding.into());
    }

    // The hold guarantees the bicycle is still `reserved` unless an admin
    // override moved it; treat that as unavailability.
    let bicycle =
        BicycleRepo::lock_by_id(&mut *tx, reservation.bicycle_id, BicycleStatus::Reserved)
            .await?
            .ok_or_else(|| LifecycleError::BicycleUnavailable {
                device_id: reservation.bicycle_id.to_string(),
            })?;

    ReservationRepo::set_status(&mut *tx, reservation.id, ReservationStatus::Confirmed).await?;
    let rental = RentalRepo::create_ongoing(&mut *tx, user_id, bicycle.id)
        .await
        .map_err(|e| super::lifecycle::map_ongoing_unique_violation(e, &bicycle.device_id))?;
    BicycleRepo::set_status(&mut *tx, bicycle.id, BicycleStatus::InUse).await?;

    tx.commit().await?;

    tracing::info!(
        user_id,
        reservation_id,
        rental_id = rental.id,
        bicycle_id = bicycle.id,
        "Reservation confirmed, ride started",
    );

    Ok(RideStarted {
        rental_id: rental.id,
        bicycle_id: bicycle.id,
        device_id: bicycle.device_id,
        start_time: rental.start_time,
    })
}

/// Withdraw a pending hold and free its bicycle.
pub async fn cancel(
    pool: &PgPool,
    user_id: DbId,
    reservation_id: DbId,
) -> Result<Reservation, AppError> {
    let mut tx = pool.begin().await?;

    let reservation = ReservationRepo::lock_pending(&mut *tx, reservation_id, user_id)
        .await?
        .ok_or(LifecycleError::ReservationNotFound { id: reservation_id })?;

    let cancelled =
        ReservationRepo::set_status(&mut *tx, reservation.id, ReservationStatus::Cancelled)
            .await?;
    if let Some(bicycle) =
        BicycleRepo::lock_by_id(&mut *tx, reservation.bicycle_id, BicycleStatus::Reserved).await?
    {
        BicycleRepo::set_status(&mut *tx, bicycle.id, BicycleStatus::Available).await?;
    }

    tx.commit().await?;

    tracing::info!(user_id, reservation_id, "Reservation cancelled");

    Ok(cancelled)
}

/// Translate the one-pending-hold-per-bicycle index violation into the
/// rejection the loser of the race would have received anyway.
fn map_pending_unique_violation(err: sqlx::Error, device_id: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint() == Some("uq_reservations_bicycle_pending")
        {
            return LifecycleError::BicycleUnavailable {
                device_id: device_id.to_string(),
            }
            .into();
        }
    }
    AppError::Database(err)
}
