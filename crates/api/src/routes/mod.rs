//! Route definitions.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod payments;
pub mod subscriptions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                      signup (public)
/// /auth/signin                      signin (public, lockout-gated)
/// /auth/signout                     signout (requires auth)
/// /auth/change-password             change password (requires auth)
/// /auth/me                          session-check (requires auth)
///
/// /services                         grouped catalog (requires auth)
/// /restore                          credential fetch (requires auth)
///
/// /plans                            active plans (public)
/// /subscriptions                    begin purchase (requires auth)
/// /subscriptions/status             subscription state (requires auth)
/// /subscriptions/expire-sweep       bulk expiry flip (admin only)
///
/// /payments/callback                gateway settlement (public)
///
/// /admin/users/{id}/ban             ban/unban (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(catalog::router())
        .merge(subscriptions::router())
        .merge(payments::router())
        .nest("/admin", admin::router())
}
