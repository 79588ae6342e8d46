//! Handler for single-service credential fetches.
//!
//! Authorization is re-run on every fetch -- a prior catalog response is
//! never trusted. Denials are machine-readable: `authentication_required`
//! comes from the extractor, `subscription_required` from the entitlement
//! check, and an unknown or inactive service code is reported exactly like
//! an out-of-plan one so callers cannot probe the catalog.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use knox_core::cookie::CookieDescriptor;
use knox_core::entitlement::{self, ServiceAccess};
use knox_core::subscription::SubscriptionState;
use knox_db::repositories::{ServiceRepo, SubscriptionRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /restore`.
#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub service_code: String,
}

/// The credential descriptor set for one authorized service.
#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub service_code: String,
    pub cookies: Vec<CookieDescriptor>,
}

/// POST /api/v1/restore
///
/// Authorize and return the full descriptor set for one service. The read
/// has no side effect on the credential data: fetching twice returns the
/// identical set.
pub async fn restore(
    State(state): State<AppState>,
    auth: CurrentUser,
    Json(input): Json<RestoreRequest>,
) -> AppResult<Json<DataResponse<RestoreResponse>>> {
    let service = ServiceRepo::find_by_code(&state.pool, &input.service_code).await?;

    // Reading the subscription runs the lazy expiry flip before the
    // decision, so an overdue row denies and self-heals in one step.
    let subscription = SubscriptionRepo::read(&state.pool, auth.user.id).await?;
    let state_now = subscription
        .as_ref()
        .map(|s| s.state(Utc::now()))
        .unwrap_or(SubscriptionState::None);

    let access = match &service {
        Some(svc) => {
            let in_plan = match subscription.as_ref() {
                Some(sub) if state_now.is_active() => {
                    ServiceRepo::plan_includes(&state.pool, sub.plan_id, svc.id).await?
                }
                _ => false,
            };
            Some(ServiceAccess {
                active: svc.is_active,
                in_plan,
            })
        }
        None => None,
    };

    entitlement::authorize_service(auth.user.is_admin, state_now, access)?;

    let service = service.expect("authorized service must exist");
    let cookies = service
        .descriptors()
        .map_err(|e| AppError::InternalError(format!("Malformed credential payload: {e}")))?;

    tracing::info!(
        user_id = auth.user.id,
        service_code = %service.code,
        cookie_count = cookies.len(),
        "Credential set fetched"
    );

    Ok(Json(DataResponse {
        data: RestoreResponse {
            service_code: service.code,
            cookies,
        },
    }))
}
