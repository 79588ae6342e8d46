//! Subscription model.

use knox_core::subscription::{SubscriptionState, SubscriptionStatus};
use knox_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A subscription row from the `subscriptions` table (one per user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub plan_id: DbId,
    /// `active` or `expired`; enforced by a CHECK constraint.
    pub status: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Evaluate the entitlement state of this row at `now`.
    pub fn state(&self, now: Timestamp) -> SubscriptionState {
        SubscriptionState::evaluate(
            SubscriptionStatus::parse(&self.status).map(|s| (s, self.ends_at)),
            now,
        )
    }
}
