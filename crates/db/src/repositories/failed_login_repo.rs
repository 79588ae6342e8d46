//! Repository for the `failed_login_attempts` table.
//!
//! Append-only: nothing ever clears attempts. Lockout decisions count the
//! trailing window, so old failures simply age out on the next read and no
//! reset step exists to be forgotten.

use knox_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::failed_login::FailedLoginAttempt;

/// Provides append and windowed-count operations for failed login attempts.
pub struct FailedLoginRepo;

impl FailedLoginRepo {
    /// Append one failed attempt.
    pub async fn record(
        pool: &PgPool,
        user_id: DbId,
        ip_address: &str,
    ) -> Result<FailedLoginAttempt, sqlx::Error> {
        sqlx::query_as::<_, FailedLoginAttempt>(
            "INSERT INTO failed_login_attempts (user_id, ip_address)
             VALUES ($1, $2)
             RETURNING id, user_id, ip_address, attempted_at",
        )
        .bind(user_id)
        .bind(ip_address)
        .fetch_one(pool)
        .await
    }

    /// Count a user's attempts at or after `since`.
    pub async fn count_since(
        pool: &PgPool,
        user_id: DbId,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM failed_login_attempts
             WHERE user_id = $1 AND attempted_at >= $2",
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }
}
