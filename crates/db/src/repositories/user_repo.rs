//! Repository for the `users` and `user_profiles` tables.

use sqlx::PgPool;
use velo_core::types::DbId;

use crate::models::user::{CreateUser, User, UserProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_hash, role, is_active, \
                       created_at, updated_at";

/// Provides account operations for users and rider profiles.
pub struct UserRepo;

impl UserRepo {
    /// Create a user together with its rider profile in one transaction.
    ///
    /// Registration is an explicit, synchronous workflow: both rows exist
    /// or neither does. No reactive hooks.
    pub async fn create_with_profile(
        pool: &PgPool,
        input: &CreateUser,
        rfid_tag: Option<&str>,
    ) -> Result<(User, UserProfile), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users (username, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(&mut *tx)
            .await?;

        let profile = sqlx::query_as::<_, UserProfile>(
            "INSERT INTO user_profiles (user_id, rfid_tag)
             VALUES ($1, $2)
             RETURNING id, user_id, rfid_tag, registered_at",
        )
        .bind(user.id)
        .bind(rfid_tag)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((user, profile))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_profile(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, user_id, rfid_tag, registered_at
             FROM user_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}
