//! Route definitions for the catalog and credential restoration contract.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{catalog, restore};
use crate::state::AppState;

/// The two calls the remote client makes against the credential store.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/services", get(catalog::list_services))
        .route("/restore", post(restore::restore))
}
