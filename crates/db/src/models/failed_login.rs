//! Failed login attempt model.

use knox_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// One row of the append-only `failed_login_attempts` table.
#[derive(Debug, Clone, FromRow)]
pub struct FailedLoginAttempt {
    pub id: DbId,
    pub user_id: DbId,
    pub ip_address: String,
    pub attempted_at: Timestamp,
}
