//! Session model and DTOs.

use knox_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A session row from the `sessions` table.
///
/// `token` is the bearer token itself; the row is the revocation point.
/// `expires_at` is independent of (and longer than) the token's embedded
/// signature expiry.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub token: String,
    pub ip_address: Option<String>,
    pub device_info: Option<serde_json::Value>,
    pub expires_at: Timestamp,
    pub last_activity_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
pub struct CreateSession {
    pub user_id: DbId,
    pub token: String,
    pub ip_address: Option<String>,
    pub device_info: Option<serde_json::Value>,
    pub expires_at: Timestamp,
}
