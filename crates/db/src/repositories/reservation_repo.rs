//! Repository for the `reservations` table.

use sqlx::{PgConnection, PgPool};
use velo_core::types::{DbId, Timestamp};

use crate::models::reservation::{Reservation, ReservationStatus};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, bicycle_id, reserved_at, expiry_at, status";

/// Provides hold operations for reservations.
pub struct ReservationRepo;

impl ReservationRepo {
    /// Insert a pending hold. `expiry_at` is computed by the engine from
    /// the configured hold duration -- never by a column default.
    ///
    /// The partial unique index `uq_reservations_bicycle_pending` rejects a
    /// second pending hold on the same bicycle.
    pub async fn create_pending(
        conn: &mut PgConnection,
        user_id: DbId,
        bicycle_id: DbId,
        expiry_at: Timestamp,
    ) -> Result<Reservation, sqlx::Error> {
        let query = format!(
            "INSERT INTO reservations (user_id, bicycle_id, expiry_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(user_id)
            .bind(bicycle_id)
            .bind(expiry_at)
            .fetch_one(conn)
            .await
    }

    /// Acquire an exclusive row lock on a pending reservation owned by the
    /// given user. `None` covers wrong id, wrong owner, and non-pending
    /// status alike.
    pub async fn lock_pending(
        conn: &mut PgConnection,
        reservation_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE id = $1 AND user_id = $2 AND status = 'pending'
             FOR UPDATE"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(reservation_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Write a new status. Only valid while the caller holds the row lock
    /// from the same transaction.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: ReservationStatus,
    ) -> Result<Reservation, sqlx::Error> {
        let query = format!(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .bind(status)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, Reservation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One user's reservations, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reservations
             WHERE user_id = $1
             ORDER BY reserved_at DESC"
        );
        sqlx::query_as::<_, Reservation>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Expire every due pending hold and free its bicycle.
    ///
    /// One transaction: due rows are claimed with `FOR UPDATE SKIP LOCKED`
    /// so concurrent sweeps (or a confirm racing the sweep) never
    /// double-process a hold. Bicycles are only flipped back to
    /// `available` while still `reserved` -- an admin override to another
    /// status is left alone. Returns the number of holds expired.
    pub async fn expire_due(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let due: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT id, bicycle_id FROM reservations
             WHERE status = 'pending' AND expiry_at < NOW()
             FOR UPDATE SKIP LOCKED",
        )
        .fetch_all(&mut *tx)
        .await?;

        if due.is_empty() {
            return Ok(0);
        }

        let reservation_ids: Vec<DbId> = due.iter().map(|(id, _)| *id).collect();
        let bicycle_ids: Vec<DbId> = due.iter().map(|(_, bike)| *bike).collect();

        sqlx::query("UPDATE reservations SET status = 'expired' WHERE id = ANY($1)")
            .bind(&reservation_ids)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE bicycles SET status = 'available', updated_at = NOW()
             WHERE id = ANY($1) AND status = 'reserved'",
        )
        .bind(&bicycle_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            expired = reservation_ids.len(),
            "Expired due reservation holds"
        );
        Ok(reservation_ids.len() as u64)
    }
}
