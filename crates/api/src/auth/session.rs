//! The session manager.
//!
//! A bearer token is only honored while its session row exists: the row,
//! not the signature, is the revocation authority. Issuing therefore always
//! pairs token generation with row creation, and validation always ends at
//! the row. The two expiries are layered on purpose -- the signature bounds
//! token replay (15 minutes), the row bounds the session itself (7 days) --
//! and both checks must stay.

use chrono::{Duration, Utc};
use knox_core::error::CoreError;
use knox_core::types::DbId;
use knox_db::models::session::CreateSession;
use knox_db::models::user::User;
use knox_db::repositories::{SessionRepo, UserRepo};
use sqlx::PgPool;

use crate::auth::jwt::{self, JwtConfig};

/// Open a new authenticated session for `user`, enforcing the
/// single-active-session policy.
///
/// Deletes every existing session row for the user (logging in from a
/// second device silently invalidates the first on its next validation),
/// then mints a signed token and persists the paired session row. Returns
/// the bearer token.
pub async fn open(
    pool: &PgPool,
    config: &JwtConfig,
    session_expiry_days: i64,
    user: &User,
    ip_address: Option<String>,
    device_info: Option<serde_json::Value>,
) -> Result<String, CoreError> {
    let evicted = SessionRepo::delete_all_for_user(pool, user.id)
        .await
        .map_err(internal)?;
    if evicted > 0 {
        tracing::debug!(user_id = user.id, evicted, "Evicted prior sessions on sign-in");
    }

    let token = jwt::generate_token(user.id, &user.email, user.is_admin, config)
        .map_err(|e| CoreError::Internal(format!("Token generation error: {e}")))?;

    let input = CreateSession {
        user_id: user.id,
        token: token.clone(),
        ip_address,
        device_info,
        expires_at: Utc::now() + Duration::days(session_expiry_days),
    };
    SessionRepo::create(pool, &input).await.map_err(internal)?;

    Ok(token)
}

/// Validate a presented bearer token and resolve its user.
///
/// Checks, in order: signature and signature-expiry, the existence of the
/// session row holding exactly this token, the row's own expiry, and the
/// ban flag. Every failure collapses to [`CoreError::Unauthenticated`];
/// callers cannot tell a forged token from a revoked one. On success the
/// row's `last_activity_at` is touched.
pub async fn validate(pool: &PgPool, config: &JwtConfig, token: &str) -> Result<User, CoreError> {
    if jwt::validate_token(token, config).is_err() {
        return Err(CoreError::Unauthenticated);
    }

    let session = SessionRepo::find_by_token(pool, token)
        .await
        .map_err(internal)?
        .ok_or(CoreError::Unauthenticated)?;

    if session.expires_at <= Utc::now() {
        return Err(CoreError::Unauthenticated);
    }

    let user = UserRepo::find_by_id(pool, session.user_id)
        .await
        .map_err(internal)?
        .ok_or(CoreError::Unauthenticated)?;

    // Ban is checked on every validation, not only at sign-in.
    if user.banned {
        return Err(CoreError::Unauthenticated);
    }

    SessionRepo::touch(pool, session.id).await.map_err(internal)?;

    Ok(user)
}

/// Revoke sessions for a user, optionally sparing one token.
///
/// Password change revokes every *other* session but keeps the one that
/// performed the change; ban and sign-out-everywhere pass `None`.
pub async fn revoke(
    pool: &PgPool,
    user_id: DbId,
    except_token: Option<&str>,
) -> Result<u64, CoreError> {
    let deleted = match except_token {
        Some(token) => SessionRepo::delete_all_except(pool, user_id, token).await,
        None => SessionRepo::delete_all_for_user(pool, user_id).await,
    }
    .map_err(internal)?;
    Ok(deleted)
}

fn internal(err: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("Session store error: {err}"))
}
