//! Route definition for the payment collaborator callback.

use axum::routing::post;
use axum::Router;

use crate::handlers::payment;
use crate::state::AppState;

/// Unauthenticated by design: the gateway is not a bearer-token client.
/// The order id is the only linkage and settlement is idempotent.
pub fn router() -> Router<AppState> {
    Router::new().route("/payments/callback", post(payment::callback))
}
