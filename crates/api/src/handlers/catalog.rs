//! Handler for the grouped service catalog.
//!
//! The catalog never carries credential payloads: the projection type
//! queried from the store has no `cookie_data` column, so a payload cannot
//! leak by accident. Grouping into group -> categories -> services is
//! presentation only and plays no part in authorization.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use knox_core::entitlement;
use knox_core::subscription::SubscriptionState;
use knox_core::types::DbId;
use knox_db::models::service::CatalogRow;
use knox_db::repositories::{ServiceRepo, SubscriptionRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// One service entry in the catalog. No credential payload, ever.
#[derive(Debug, Serialize)]
pub struct CatalogService {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub is_maintenance: bool,
}

/// A category of services within a group.
#[derive(Debug, Serialize)]
pub struct CatalogCategory {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub services: Vec<CatalogService>,
}

/// A top-level service group.
#[derive(Debug, Serialize)]
pub struct CatalogGroup {
    pub id: DbId,
    pub name: String,
    pub categories: Vec<CatalogCategory>,
}

/// GET /api/v1/services
///
/// The catalog visible to the caller: everything active for admins, the
/// current plan's active services for active subscribers, empty otherwise.
pub async fn list_services(
    State(state): State<AppState>,
    auth: CurrentUser,
) -> AppResult<Json<DataResponse<Vec<CatalogGroup>>>> {
    let rows = if auth.user.is_admin {
        ServiceRepo::catalog_all_active(&state.pool).await?
    } else {
        let subscription = SubscriptionRepo::read(&state.pool, auth.user.id).await?;
        let state_now = subscription
            .as_ref()
            .map(|s| s.state(Utc::now()))
            .unwrap_or(SubscriptionState::None);

        if !entitlement::catalog_visible(auth.user.is_admin, state_now) {
            return Ok(Json(DataResponse { data: Vec::new() }));
        }

        // The subscription row is authoritative for the plan, not the
        // cached user column.
        let plan_id = subscription.map(|s| s.plan_id).unwrap_or_default();
        ServiceRepo::catalog_for_plan(&state.pool, plan_id).await?
    };

    Ok(Json(DataResponse {
        data: group_catalog(rows),
    }))
}

/// Fold flat catalog rows into the grouped presentation shape.
///
/// Rows arrive ordered by group, category, service; grouping preserves
/// that order.
fn group_catalog(rows: Vec<CatalogRow>) -> Vec<CatalogGroup> {
    let mut groups: Vec<CatalogGroup> = Vec::new();

    for row in rows {
        if groups.last().map(|g| g.id) != Some(row.group_id) {
            groups.push(CatalogGroup {
                id: row.group_id,
                name: row.group_name.clone(),
                categories: Vec::new(),
            });
        }
        let group = groups.last_mut().unwrap();

        if group.categories.last().map(|c| c.id) != Some(row.category_id) {
            group.categories.push(CatalogCategory {
                id: row.category_id,
                name: row.category_name.clone(),
                description: row.category_description.clone(),
                icon_url: row.category_icon_url.clone(),
                services: Vec::new(),
            });
        }
        group.categories.last_mut().unwrap().services.push(CatalogService {
            id: row.service_id,
            code: row.code,
            name: row.name,
            description: row.description,
            is_maintenance: row.is_maintenance,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(group_id: DbId, category_id: DbId, service_id: DbId, code: &str) -> CatalogRow {
        CatalogRow {
            service_id,
            code: code.to_string(),
            name: code.to_uppercase(),
            description: None,
            is_maintenance: false,
            category_id,
            category_name: format!("category-{category_id}"),
            category_description: None,
            category_icon_url: None,
            group_id,
            group_name: format!("group-{group_id}"),
        }
    }

    #[test]
    fn test_grouping_nests_by_group_then_category() {
        let rows = vec![
            row(1, 10, 100, "netflix"),
            row(1, 10, 101, "hulu"),
            row(1, 11, 102, "spotify"),
            row(2, 20, 200, "figma"),
        ];

        let groups = group_catalog(rows);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].categories.len(), 2);
        assert_eq!(groups[0].categories[0].services.len(), 2);
        assert_eq!(groups[0].categories[1].services[0].code, "spotify");
        assert_eq!(groups[1].categories[0].services[0].code, "figma");
    }

    #[test]
    fn test_grouping_empty_rows() {
        assert!(group_catalog(Vec::new()).is_empty());
    }

    #[test]
    fn test_catalog_service_serialization_has_no_payload_field() {
        let groups = group_catalog(vec![row(1, 10, 100, "netflix")]);
        let json = serde_json::to_value(&groups).unwrap();
        let service = &json[0]["categories"][0]["services"][0];
        assert!(service.get("cookie_data").is_none());
        assert!(service.get("cookies").is_none());
        assert_eq!(service["code"], "netflix");
    }
}
