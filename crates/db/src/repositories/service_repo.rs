//! Repository for the `services` table and the plan-service mapping.

use knox_core::types::DbId;
use sqlx::PgPool;

use crate::models::service::{CatalogRow, Service};

/// Full-row column list, used only by the credential-fetch path.
const COLUMNS: &str = "id, code, name, description, category_id, cookie_data, \
                        is_active, is_maintenance, created_at";

/// Catalog projection columns. `cookie_data` is intentionally absent:
/// catalog responses must never carry credential payloads.
const CATALOG_COLUMNS: &str = "s.id AS service_id, s.code, s.name, s.description, \
                        s.is_maintenance, \
                        c.id AS category_id, c.name AS category_name, \
                        c.description AS category_description, \
                        c.icon_url AS category_icon_url, \
                        g.id AS group_id, g.name AS group_name";

/// Provides catalog reads and single-service credential lookups.
pub struct ServiceRepo;

impl ServiceRepo {
    /// Find a service by its unique code, credential payload included.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Service>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM services WHERE code = $1");
        sqlx::query_as::<_, Service>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Whether `plan_id` maps to `service_id` in the entitlement mapping.
    pub async fn plan_includes(
        pool: &PgPool,
        plan_id: DbId,
        service_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM plan_services WHERE plan_id = $1 AND service_id = $2
             )",
        )
        .bind(plan_id)
        .bind(service_id)
        .fetch_one(pool)
        .await
    }

    /// Every service visible to an admin: active service in an active
    /// category within an active group.
    pub async fn catalog_all_active(pool: &PgPool) -> Result<Vec<CatalogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CATALOG_COLUMNS}
             FROM services s
             JOIN service_categories c ON c.id = s.category_id
             JOIN service_groups g ON g.id = c.group_id
             WHERE s.is_active AND c.is_active AND g.is_active
             ORDER BY g.name, c.name, s.name"
        );
        sqlx::query_as::<_, CatalogRow>(&query).fetch_all(pool).await
    }

    /// The catalog visible to a subscriber of `plan_id`: the active subset
    /// additionally restricted to the plan's service mapping.
    pub async fn catalog_for_plan(
        pool: &PgPool,
        plan_id: DbId,
    ) -> Result<Vec<CatalogRow>, sqlx::Error> {
        let query = format!(
            "SELECT {CATALOG_COLUMNS}
             FROM services s
             JOIN service_categories c ON c.id = s.category_id
             JOIN service_groups g ON g.id = c.group_id
             JOIN plan_services ps ON ps.service_id = s.id
             WHERE ps.plan_id = $1
               AND s.is_active AND c.is_active AND g.is_active
             ORDER BY g.name, c.name, s.name"
        );
        sqlx::query_as::<_, CatalogRow>(&query)
            .bind(plan_id)
            .fetch_all(pool)
            .await
    }
}
