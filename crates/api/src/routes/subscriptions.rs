//! Route definitions for plans and subscriptions.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::subscription;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(subscription::list_plans))
        .route("/subscriptions", post(subscription::create))
        .route("/subscriptions/status", get(subscription::status))
        .route(
            "/subscriptions/expire-sweep",
            post(subscription::expire_sweep),
        )
}
