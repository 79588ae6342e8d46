//! Handler for the payment collaborator's settlement callback.
//!
//! The gateway is opaque: all the core sees is an order id and a final
//! status. A settled payment drives the none/expired -> active transition
//! of the subscription state machine.

use axum::extract::State;
use axum::Json;
use knox_core::error::CoreError;
use knox_db::repositories::{PlanRepo, SubscriptionRepo, TransactionRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Settlement status delivered by the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Success,
    Failed,
    Pending,
}

/// Request body for `POST /payments/callback`.
#[derive(Debug, Deserialize)]
pub struct PaymentCallback {
    pub order_id: String,
    pub status: CallbackStatus,
}

/// Callback acknowledgement.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub order_id: String,
    pub status: &'static str,
}

/// POST /api/v1/payments/callback
///
/// Settle a pending order. On success the subscription is created or
/// renewed with `ends_at = now + plan.duration_in_days` and the user's
/// cached plan fields are mirrored. Gateways retry callbacks, so an
/// already-settled order is acknowledged without re-activating.
pub async fn callback(
    State(state): State<AppState>,
    Json(input): Json<PaymentCallback>,
) -> AppResult<Json<DataResponse<CallbackResponse>>> {
    let transaction = TransactionRepo::find_by_order_id(&state.pool, &input.order_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(order_id = %input.order_id, "Callback for unknown order");
            AppError::Core(CoreError::NotFound {
                entity: "order",
                id: input.order_id.clone(),
            })
        })?;

    if transaction.status != "pending" {
        tracing::info!(
            order_id = %transaction.order_id,
            status = %transaction.status,
            "Callback replay ignored, order already settled"
        );
        return Ok(Json(DataResponse {
            data: CallbackResponse {
                order_id: transaction.order_id,
                status: "already_settled",
            },
        }));
    }

    let settled = match input.status {
        CallbackStatus::Success => {
            TransactionRepo::set_status(&state.pool, transaction.id, "success").await?;

            let plan = PlanRepo::find_by_id(&state.pool, transaction.plan_id)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError(format!(
                        "Order {} references missing plan {}",
                        transaction.order_id, transaction.plan_id
                    ))
                })?;

            let sub = SubscriptionRepo::activate(
                &state.pool,
                transaction.user_id,
                plan.id,
                plan.duration_in_days,
            )
            .await?;

            tracing::info!(
                user_id = transaction.user_id,
                plan_id = plan.id,
                ends_at = %sub.ends_at,
                "Subscription activated"
            );
            "success"
        }
        CallbackStatus::Failed => {
            TransactionRepo::set_status(&state.pool, transaction.id, "failed").await?;
            "failed"
        }
        CallbackStatus::Pending => "pending",
    };

    Ok(Json(DataResponse {
        data: CallbackResponse {
            order_id: transaction.order_id,
            status: settled,
        },
    }))
}
