//! Repository for the `sessions` table.
//!
//! Sessions are keyed by the bearer token itself. Deleting a row revokes
//! the token regardless of its remaining signature lifetime.

use knox_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, token, ip_address, device_info, \
                        expires_at, last_activity_at, created_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, token, ip_address, device_info, expires_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.token)
            .bind(&input.ip_address)
            .bind(&input.device_info)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find the session row holding exactly this token.
    ///
    /// Expiry is NOT filtered here; the caller distinguishes a missing row
    /// from an expired one only insofar as both mean "unauthenticated".
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE token = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Stamp `last_activity_at` on a validated session.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sessions SET last_activity_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Delete the session for one (user, token) pair. Returns `true` if a
    /// row was deleted.
    pub async fn delete_one(pool: &PgPool, user_id: DbId, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session of a user. Used by single-session enforcement
    /// at sign-in and by ban. Returns the count of deleted rows.
    pub async fn delete_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every session of a user except the given token. Used by
    /// password change, which keeps the session that performed it.
    pub async fn delete_all_except(
        pool: &PgPool,
        user_id: DbId,
        token: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND token <> $2")
            .bind(user_id)
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count live sessions for a user.
    pub async fn count_for_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
