//! Service model and catalog projection.

use knox_core::cookie::CookieDescriptor;
use knox_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full service row from the `services` table, credential payload included.
///
/// Only the credential-fetch path may load this struct; catalog queries use
/// [`CatalogRow`], which never selects `cookie_data`.
#[derive(Debug, Clone, FromRow)]
pub struct Service {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: DbId,
    pub cookie_data: serde_json::Value,
    pub is_active: bool,
    pub is_maintenance: bool,
    pub created_at: Timestamp,
}

impl Service {
    /// Parse the stored JSON payload into typed credential descriptors.
    pub fn descriptors(&self) -> Result<Vec<CookieDescriptor>, serde_json::Error> {
        serde_json::from_value(self.cookie_data.clone())
    }
}

/// One flattened catalog row: service joined with its category and group.
///
/// Deliberately has no `cookie_data` field, so the payload cannot leak into
/// a catalog response by construction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogRow {
    pub service_id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_maintenance: bool,
    pub category_id: DbId,
    pub category_name: String,
    pub category_description: Option<String>,
    pub category_icon_url: Option<String>,
    pub group_id: DbId,
    pub group_name: String,
}
