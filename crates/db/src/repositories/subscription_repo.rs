//! Repository for the `subscriptions` table.
//!
//! The normalized row is the authoritative entitlement source; the
//! denormalized `users.current_plan_id` / `users.subscription_ends_at`
//! projection is written only here, inside the same transaction as the row
//! change, so the two can never drift apart.

use chrono::{Duration, Utc};
use knox_core::types::DbId;
use sqlx::PgPool;

use crate::models::subscription::Subscription;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, plan_id, status, starts_at, ends_at, \
                        created_at, updated_at";

/// Provides read/activate/sweep operations for subscriptions.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// Read a user's subscription, lazily expiring it when overdue.
    ///
    /// Check-and-flip runs in one transaction with the row locked, so two
    /// concurrent reads cannot both decide to flip. When the row is
    /// `active` past `ends_at`, this flips it to `expired` and clears the
    /// user's cached plan fields before returning the flipped row.
    pub async fn read(pool: &PgPool, user_id: DbId) -> Result<Option<Subscription>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM subscriptions WHERE user_id = $1 FOR UPDATE");
        let Some(sub) = sqlx::query_as::<_, Subscription>(&select)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.commit().await?;
            return Ok(None);
        };

        if sub.status == "active" && sub.ends_at <= Utc::now() {
            let flip = format!(
                "UPDATE subscriptions SET status = 'expired', updated_at = NOW()
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            );
            let flipped = sqlx::query_as::<_, Subscription>(&flip)
                .bind(sub.id)
                .fetch_one(&mut *tx)
                .await?;

            sqlx::query(
                "UPDATE users SET current_plan_id = NULL, subscription_ends_at = NULL
                 WHERE id = $1",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            tracing::info!(user_id, subscription_id = flipped.id, "Subscription lazily expired");
            return Ok(Some(flipped));
        }

        tx.commit().await?;
        Ok(Some(sub))
    }

    /// Activate (or renew) a user's subscription for `plan_id`.
    ///
    /// Upserts the single per-user row: first payment creates it, renewal
    /// resets `starts_at`/`ends_at` and flips status back to `active`. The
    /// user's cached plan fields are mirrored in the same transaction.
    pub async fn activate(
        pool: &PgPool,
        user_id: DbId,
        plan_id: DbId,
        duration_in_days: i32,
    ) -> Result<Subscription, sqlx::Error> {
        let now = Utc::now();
        let ends_at = now + Duration::days(i64::from(duration_in_days));

        let mut tx = pool.begin().await?;

        let upsert = format!(
            "INSERT INTO subscriptions (user_id, plan_id, status, starts_at, ends_at)
             VALUES ($1, $2, 'active', $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET
                plan_id = EXCLUDED.plan_id,
                status = 'active',
                starts_at = EXCLUDED.starts_at,
                ends_at = EXCLUDED.ends_at,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        let sub = sqlx::query_as::<_, Subscription>(&upsert)
            .bind(user_id)
            .bind(plan_id)
            .bind(now)
            .bind(ends_at)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE users SET current_plan_id = $2, subscription_ends_at = $3
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(ends_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(sub)
    }

    /// Flip every overdue `active` subscription to `expired` and clear the
    /// owners' cached plan fields. Returns the count of flipped rows.
    ///
    /// Purely an optimization: the lazy flip in [`Self::read`] already keeps
    /// every entitlement check correct without this.
    pub async fn sweep_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user_ids: Vec<DbId> = sqlx::query_scalar(
            "UPDATE subscriptions SET status = 'expired', updated_at = NOW()
             WHERE status = 'active' AND ends_at <= NOW()
             RETURNING user_id",
        )
        .fetch_all(&mut *tx)
        .await?;

        if !user_ids.is_empty() {
            sqlx::query(
                "UPDATE users SET current_plan_id = NULL, subscription_ends_at = NULL
                 WHERE id = ANY($1)",
            )
            .bind(&user_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(user_ids.len() as u64)
    }
}
