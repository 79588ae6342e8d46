//! Payment transaction model and DTOs.

use knox_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A payment order row from the `transactions` table.
///
/// Created `pending` when a purchase begins; the gateway callback settles
/// it to `success` or `failed`. The gateway itself is opaque to the core.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    pub user_id: DbId,
    pub plan_id: DbId,
    pub order_id: String,
    pub amount: i64,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording a new pending order.
pub struct CreateTransaction {
    pub user_id: DbId,
    pub plan_id: DbId,
    pub order_id: String,
    pub amount: i64,
}
