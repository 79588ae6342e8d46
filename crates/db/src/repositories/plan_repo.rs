//! Repository for the `plans` table.

use knox_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::Plan;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, price, duration_in_days, features, \
                        is_popular, is_active, created_at";

/// Provides read operations for plans (management is external).
pub struct PlanRepo;

impl PlanRepo {
    /// Find a plan by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plans WHERE id = $1");
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active plans, cheapest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Plan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plans WHERE is_active = TRUE ORDER BY price");
        sqlx::query_as::<_, Plan>(&query).fetch_all(pool).await
    }
}
