//! Authentication extractors for Axum handlers.
//!
//! Token transport is interchangeable: `Authorization: Bearer <token>` or
//! the non-HTTP-only `token` cookie set at sign-in (the browser extension
//! reads the cookie). Either way the token is validated against the
//! session row -- signature alone is never enough.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use knox_core::error::CoreError;
use knox_db::models::user::User;

use crate::auth::session;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from a validated bearer token.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(auth: CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = auth.user.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The full user row (password hash included -- never serialize directly).
    pub user: User,
    /// The presented bearer token, kept for token-scoped revocation.
    pub token: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            extract_token(parts).ok_or(AppError::Core(CoreError::Unauthenticated))?;

        let user = session::validate(&state.pool, &state.config.jwt, &token).await?;

        Ok(CurrentUser { user, token })
    }
}

/// Authenticated admin. Rejects non-admins with a 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = CurrentUser::from_request_parts(parts, state).await?;
        if !auth.user.is_admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin access required".into(),
            )));
        }
        Ok(AdminUser(auth))
    }
}

/// Pull the bearer token from the `Authorization` header, falling back to
/// the `token` cookie.
fn extract_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    parts
        .headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
}

fn token_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "token" && !value.is_empty()).then(|| value.to_string())
    })
}
