//! Repository for the `transactions` table.

use knox_core::types::DbId;
use sqlx::PgPool;

use crate::models::transaction::{CreateTransaction, Transaction};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, plan_id, order_id, amount, status, \
                        created_at, updated_at";

/// Provides CRUD operations for payment transactions.
pub struct TransactionRepo;

impl TransactionRepo {
    /// Record a new pending order, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        let query = format!(
            "INSERT INTO transactions (user_id, plan_id, order_id, amount)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(input.user_id)
            .bind(input.plan_id)
            .bind(&input.order_id)
            .bind(input.amount)
            .fetch_one(pool)
            .await
    }

    /// Find an order by the gateway-facing order id.
    pub async fn find_by_order_id(
        pool: &PgPool,
        order_id: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transactions WHERE order_id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(order_id)
            .fetch_optional(pool)
            .await
    }

    /// Settle an order's status. Returns the updated row.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!(
            "UPDATE transactions SET status = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// List a user's orders, most recent first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Transaction>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM transactions WHERE user_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
