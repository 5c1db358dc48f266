//! Repository for the `bicycles` table.
//!
//! The lock operations implement the inventory-store contract consumed by
//! the rental lifecycle engine: an exclusive, transaction-scoped row lock
//! acquired by `device_id` (or `id`) together with an expected status. A
//! miss means "unknown device or status mismatch" -- callers cannot and do
//! not need to distinguish the two.

use sqlx::{PgConnection, PgPool};
use velo_core::types::DbId;

use crate::models::bicycle::{
    Bicycle, BicycleStatus, CreateBicycle, DeleteBicycleOutcome, UpdateBicycle,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, device_id, status, latitude, longitude, \
                       last_update, created_at, updated_at";

/// Provides inventory operations for bicycles.
pub struct BicycleRepo;

impl BicycleRepo {
    /// List the whole inventory, ordered by device id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Bicycle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bicycles ORDER BY device_id");
        sqlx::query_as::<_, Bicycle>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Bicycle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bicycles WHERE id = $1");
        sqlx::query_as::<_, Bicycle>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_device(
        pool: &PgPool,
        device_id: &str,
    ) -> Result<Option<Bicycle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bicycles WHERE device_id = $1");
        sqlx::query_as::<_, Bicycle>(&query)
            .bind(device_id)
            .fetch_optional(pool)
            .await
    }

    /// Register a new bicycle. Status defaults to `available`.
    pub async fn create(pool: &PgPool, input: &CreateBicycle) -> Result<Bicycle, sqlx::Error> {
        let query = format!(
            "INSERT INTO bicycles (device_id, status, latitude, longitude)
             VALUES ($1, COALESCE($2, 'available'::bicycle_status), $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bicycle>(&query)
            .bind(&input.device_id)
            .bind(input.status)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_one(pool)
            .await
    }

    /// Update a bicycle (admin). Omitted fields are left unchanged.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBicycle,
    ) -> Result<Option<Bicycle>, sqlx::Error> {
        let query = format!(
            "UPDATE bicycles SET
                 device_id = COALESCE($2, device_id),
                 status    = COALESCE($3, status),
                 latitude  = COALESCE($4, latitude),
                 longitude = COALESCE($5, longitude),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bicycle>(&query)
            .bind(id)
            .bind(&input.device_id)
            .bind(input.status)
            .bind(input.latitude)
            .bind(input.longitude)
            .fetch_optional(pool)
            .await
    }

    /// Delete a bicycle unless an ongoing rental still references it.
    ///
    /// Runs as one transaction: the row lock makes the existence check and
    /// the delete atomic against a concurrent ride start.
    pub async fn delete_if_unreferenced(
        pool: &PgPool,
        id: DbId,
    ) -> Result<DeleteBicycleOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM bicycles WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(DeleteBicycleOutcome::NotFound);
        }

        let (referenced,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM rental_logs WHERE bicycle_id = $1 AND status = 'ongoing'
             )",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if referenced {
            return Ok(DeleteBicycleOutcome::HasOngoingRental);
        }

        sqlx::query("DELETE FROM bicycles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DeleteBicycleOutcome::Deleted)
    }

    /// Acquire an exclusive row lock on the bicycle with the given device id
    /// and expected status.
    ///
    /// Returns `None` when no such row exists (unknown device or status
    /// mismatch). The lock is held until the enclosing transaction ends.
    pub async fn lock_by_device(
        conn: &mut PgConnection,
        device_id: &str,
        expected: BicycleStatus,
    ) -> Result<Option<Bicycle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bicycles
             WHERE device_id = $1 AND status = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, Bicycle>(&query)
            .bind(device_id)
            .bind(expected)
            .fetch_optional(conn)
            .await
    }

    /// Same as [`Self::lock_by_device`], keyed by surrogate id. Used by the
    /// completion and reservation paths that already hold a row reference.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
        expected: BicycleStatus,
    ) -> Result<Option<Bicycle>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM bicycles
             WHERE id = $1 AND status = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, Bicycle>(&query)
            .bind(id)
            .bind(expected)
            .fetch_optional(conn)
            .await
    }

    /// Write a new status. Only valid while the caller holds the row lock
    /// from the same transaction.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: BicycleStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE bicycles SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Update GPS coordinates from the telemetry webhook.
    ///
    /// Touches `latitude`, `longitude`, and `last_update` only -- telemetry
    /// never changes status. Returns `None` for an unknown device.
    pub async fn update_location(
        pool: &PgPool,
        device_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Bicycle>, sqlx::Error> {
        let query = format!(
            "UPDATE bicycles
             SET latitude = $2, longitude = $3, last_update = NOW()
             WHERE device_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Bicycle>(&query)
            .bind(device_id)
            .bind(latitude)
            .bind(longitude)
            .fetch_optional(pool)
            .await
    }

}
