//! Handlers for plans and the subscription lifecycle.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use knox_core::error::CoreError;
use knox_core::types::DbId;
use knox_db::models::plan::Plan;
use knox_db::models::subscription::Subscription;
use knox_db::models::transaction::CreateTransaction;
use knox_db::repositories::{PlanRepo, SubscriptionRepo, TransactionRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AdminUser, CurrentUser};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /subscriptions`.
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub plan_id: DbId,
}

/// Pending order details returned when a purchase begins. The opaque
/// payment collaborator settles the order via the callback endpoint.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub transaction_id: DbId,
    pub amount: i64,
}

/// Response for `GET /subscriptions/status`.
#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub has_active_subscription: bool,
    pub subscription: Option<Subscription>,
    pub plan: Option<Plan>,
}

/// Response for the admin expiry sweep.
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub expired_count: u64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/plans
///
/// Active plans for the subscribe flow. Public.
pub async fn list_plans(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Plan>>>> {
    let plans = PlanRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// GET /api/v1/subscriptions/status
///
/// The caller's subscription state. The read itself performs the lazy
/// expiry flip, so an overdue row comes back already `expired`.
pub async fn status(
    State(state): State<AppState>,
    auth: CurrentUser,
) -> AppResult<Json<DataResponse<SubscriptionStatusResponse>>> {
    let subscription = SubscriptionRepo::read(&state.pool, auth.user.id).await?;

    let has_active_subscription = subscription
        .as_ref()
        .map(|s| s.state(Utc::now()).is_active())
        .unwrap_or(false);

    let plan = match &subscription {
        Some(sub) => PlanRepo::find_by_id(&state.pool, sub.plan_id).await?,
        None => None,
    };

    Ok(Json(DataResponse {
        data: SubscriptionStatusResponse {
            has_active_subscription,
            subscription,
            plan,
        },
    }))
}

/// POST /api/v1/subscriptions
///
/// Begin a purchase: validate the plan, enforce the renewal gate, and
/// record a pending order for the payment collaborator to settle.
///
/// The gate blocks duplicate overlapping purchases: while a subscription
/// is active and ends more than the grace window away, a new order is
/// refused. Within the window (or after expiry) renewal is allowed.
pub async fn create(
    State(state): State<AppState>,
    auth: CurrentUser,
    Json(input): Json<CreateSubscriptionRequest>,
) -> AppResult<Json<DataResponse<OrderResponse>>> {
    let plan = PlanRepo::find_by_id(&state.pool, input.plan_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "plan",
                id: input.plan_id.to_string(),
            })
        })?;

    if let Some(sub) = SubscriptionRepo::read(&state.pool, auth.user.id).await? {
        let grace_horizon = Utc::now() + Duration::days(state.config.renewal_grace_days);
        if sub.status == "active" && sub.ends_at > grace_horizon {
            return Err(AppError::Core(CoreError::Conflict(
                "You already have an active subscription".into(),
            )));
        }
    }

    let order_id = format!("SUB-{}-{}", auth.user.id, Uuid::new_v4().simple());
    let transaction = TransactionRepo::create(
        &state.pool,
        &CreateTransaction {
            user_id: auth.user.id,
            plan_id: plan.id,
            order_id,
            amount: plan.price,
        },
    )
    .await?;

    tracing::info!(
        user_id = auth.user.id,
        plan_id = plan.id,
        order_id = %transaction.order_id,
        "Pending order created"
    );

    Ok(Json(DataResponse {
        data: OrderResponse {
            order_id: transaction.order_id.clone(),
            transaction_id: transaction.id,
            amount: transaction.amount,
        },
    }))
}

/// POST /api/v1/subscriptions/expire-sweep
///
/// Admin-only bulk flip of overdue subscriptions. An optimization, not a
/// correctness requirement -- every entitlement read self-heals anyway.
pub async fn expire_sweep(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<DataResponse<SweepResponse>>> {
    let expired_count = SubscriptionRepo::sweep_expired(&state.pool).await?;
    tracing::info!(expired_count, "Expiry sweep completed");
    Ok(Json(DataResponse {
        data: SweepResponse { expired_count },
    }))
}
