//! Plan model.

use knox_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A plan row from the `plans` table.
///
/// The entitlement mapping itself lives in `plan_services`; from a
/// subscriber's perspective a plan is immutable for the life of their
/// subscription (already-fetched credentials are not revoked when the
/// mapping changes, but future catalog and restore calls see the update).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub name: String,
    /// Price in minor currency units.
    pub price: i64,
    pub duration_in_days: i32,
    pub features: serde_json::Value,
    pub is_popular: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
}
