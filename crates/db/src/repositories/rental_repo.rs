//! Repository for the `rental_logs` table -- the rental ledger.
//!
//! Ledger rows are the derived side of the lifecycle: `bicycles.status` is
//! the authoritative lock token, and the engine changes both inside one
//! transaction. The `lock_ongoing` / `create_ongoing` / `mark_completed`
//! operations therefore take `&mut PgConnection`.

use sqlx::{PgConnection, PgPool};
use velo_core::types::{DbId, Timestamp};

use crate::models::rental::RentalLog;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, bicycle_id, start_time, end_time, \
                       duration_minutes, distance_km, status";

/// Provides ledger operations for rentals.
pub struct RentalRepo;

impl RentalRepo {
    /// Whether the user currently has an ongoing rental.
    pub async fn has_ongoing(conn: &mut PgConnection, user_id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM rental_logs WHERE user_id = $1 AND status = 'ongoing'
             )",
        )
        .bind(user_id)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    /// Open a new ledger row with `status = ongoing` and `start_time = NOW()`.
    ///
    /// The partial unique indexes `uq_rental_logs_user_ongoing` and
    /// `uq_rental_logs_bicycle_ongoing` back this insert: a violation means
    /// a concurrent transaction won the race and the caller's transaction
    /// must abort.
    pub async fn create_ongoing(
        conn: &mut PgConnection,
        user_id: DbId,
        bicycle_id: DbId,
    ) -> Result<RentalLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO rental_logs (user_id, bicycle_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalLog>(&query)
            .bind(user_id)
            .bind(bicycle_id)
            .fetch_one(conn)
            .await
    }

    /// Acquire an exclusive row lock on an ongoing rental.
    ///
    /// Filtered by id, `status = ongoing`, and (when given) the owning
    /// user. Wrong id, wrong owner, and already-completed all return
    /// `None` -- indistinguishable to the caller so rental ids of other
    /// users are not probeable. Admin overrides pass `owner = None`.
    pub async fn lock_ongoing(
        conn: &mut PgConnection,
        rental_id: DbId,
        owner: Option<DbId>,
    ) -> Result<Option<RentalLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_logs
             WHERE id = $1
               AND status = 'ongoing'
               AND ($2::BIGINT IS NULL OR user_id = $2)
             FOR UPDATE"
        );
        sqlx::query_as::<_, RentalLog>(&query)
            .bind(rental_id)
            .bind(owner)
            .fetch_optional(conn)
            .await
    }

    /// Close a rental: set `end_time`, `duration_minutes`, optional
    /// `distance_km`, and flip the status to `completed`.
    ///
    /// The `status = 'ongoing'` filter makes a double-complete a
    /// `RowNotFound` that aborts the transaction instead of overwriting
    /// the immutable completion fields.
    pub async fn mark_completed(
        conn: &mut PgConnection,
        rental_id: DbId,
        end_time: Timestamp,
        duration_minutes: f64,
        distance_km: Option<f64>,
    ) -> Result<RentalLog, sqlx::Error> {
        let query = format!(
            "UPDATE rental_logs
             SET end_time = $2, duration_minutes = $3, distance_km = $4,
                 status = 'completed'
             WHERE id = $1 AND status = 'ongoing'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RentalLog>(&query)
            .bind(rental_id)
            .bind(end_time)
            .bind(duration_minutes)
            .bind(distance_km)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<RentalLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rental_logs WHERE id = $1");
        sqlx::query_as::<_, RentalLog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The user's ongoing rental, if any.
    pub async fn find_ongoing_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<RentalLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_logs
             WHERE user_id = $1 AND status = 'ongoing'"
        );
        sqlx::query_as::<_, RentalLog>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Full ledger, newest first (admin).
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RentalLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_logs
             ORDER BY start_time DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, RentalLog>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// One user's ride history, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RentalLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rental_logs
             WHERE user_id = $1
             ORDER BY start_time DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, RentalLog>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Number of ongoing ledger rows referencing the bicycle. The lifecycle
    /// invariant keeps this at 0 or 1.
    pub async fn count_ongoing_for_bicycle(
        pool: &PgPool,
        bicycle_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM rental_logs WHERE bicycle_id = $1 AND status = 'ongoing'",
        )
        .bind(bicycle_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Hard-delete a ledger row (admin purge, the audit exception).
    /// Returns `true` if a row was removed.
    pub async fn purge(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rental_logs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
