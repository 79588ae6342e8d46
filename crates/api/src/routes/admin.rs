//! Route definitions for the `/admin` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. Admin role enforced by handler extractors.
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}/ban", post(admin::ban_user))
}
