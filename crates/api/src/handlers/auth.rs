//! Handlers for the `/auth` resource (signup, signin, signout,
//! change-password, session-check).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use knox_core::error::CoreError;
use knox_db::models::plan::Plan;
use knox_db::models::subscription::Subscription;
use knox_db::models::user::{CreateUser, UserResponse};
use knox_db::repositories::{FailedLoginRepo, PlanRepo, SessionRepo, SubscriptionRepo, UserRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

/// Request body for `POST /auth/signin`.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/change-password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "New password must be at least 8 characters long"))]
    pub new_password: String,
}

/// Successful authentication response returned by signin.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Profile + entitlement summary returned by the session-check endpoint.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub subscription: Option<Subscription>,
    pub plan: Option<Plan>,
    pub has_active_subscription: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a new account. Sign-in is a separate step.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "User with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/v1/auth/signin
///
/// Authenticate with email + password.
///
/// Order of checks matters: the lockout window is consulted BEFORE the
/// password is verified, so a locked account never pays the hash cost and
/// a correct password cannot bypass the lockout. On success every prior
/// session of the user is evicted (single-session policy) and the token is
/// returned both in the body and as a non-HTTP-only cookie the extension
/// can read.
pub async fn signin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<SigninRequest>,
) -> AppResult<impl IntoResponse> {
    // Unknown and banned accounts fail identically to a bad password.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .filter(|u| !u.banned)
        .ok_or(AppError::Core(CoreError::Unauthenticated))?;

    let ip_address = client_ip(&headers);

    // Lockout check comes first.
    let window_start = Utc::now() - Duration::minutes(state.config.login_window_mins);
    let failures = FailedLoginRepo::count_since(&state.pool, user.id, window_start).await?;
    if failures >= state.config.login_max_failures {
        tracing::warn!(user_id = user.id, failures, "Sign-in rejected: account locked");
        return Err(AppError::Core(CoreError::LockedOut));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        FailedLoginRepo::record(&state.pool, user.id, &ip_address).await?;
        return Err(AppError::Core(CoreError::Unauthenticated));
    }

    let device_info = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|ua| json!({ "userAgent": ua }));

    let token = session::open(
        &state.pool,
        &state.config.jwt,
        state.config.session_expiry_days,
        &user,
        Some(ip_address),
        device_info,
    )
    .await?;

    UserRepo::record_login(&state.pool, user.id).await?;

    let cookie = session_cookie(&token, state.config.session_expiry_days);
    let body = Json(DataResponse {
        data: AuthResponse {
            token,
            user: UserResponse::from(&user),
        },
    });

    Ok(([(SET_COOKIE, cookie)], body))
}

/// POST /api/v1/auth/signout
///
/// Delete the presented token's session row and clear the cookie.
pub async fn signout(
    State(state): State<AppState>,
    auth: CurrentUser,
) -> AppResult<impl IntoResponse> {
    SessionRepo::delete_one(&state.pool, auth.user.id, &auth.token).await?;

    Ok((
        [(SET_COOKIE, clear_session_cookie())],
        StatusCode::NO_CONTENT,
    ))
}

/// POST /api/v1/auth/change-password
///
/// Verify the current password, store the new hash, and revoke every OTHER
/// session -- the session that performed the change stays live.
pub async fn change_password(
    State(state): State<AppState>,
    auth: CurrentUser,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;

    let current_valid = verify_password(&input.current_password, &auth.user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::Core(CoreError::Validation(
            "Current password is incorrect".into(),
        )));
    }

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, auth.user.id, &new_hash).await?;

    let revoked = session::revoke(&state.pool, auth.user.id, Some(&auth.token)).await?;
    tracing::info!(user_id = auth.user.id, revoked, "Password changed, other sessions revoked");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// Session-check: profile plus the entitlement summary the client uses to
/// decide between the catalog, subscribe, and login states. Reading the
/// subscription here runs the lazy expiry flip like any other entitlement
/// read.
pub async fn me(
    State(state): State<AppState>,
    auth: CurrentUser,
) -> AppResult<Json<DataResponse<MeResponse>>> {
    let subscription = SubscriptionRepo::read(&state.pool, auth.user.id).await?;

    let has_active_subscription = subscription
        .as_ref()
        .map(|s| s.state(Utc::now()).is_active())
        .unwrap_or(false);

    let plan = match &subscription {
        Some(sub) => PlanRepo::find_by_id(&state.pool, sub.plan_id).await?,
        None => None,
    };

    // The lazy flip may have just cleared the cached plan fields; reload
    // the row so the response reflects them.
    let user = UserRepo::find_by_id(&state.pool, auth.user.id)
        .await?
        .unwrap_or(auth.user);

    Ok(Json(DataResponse {
        data: MeResponse {
            user: UserResponse::from(&user),
            subscription,
            plan,
            has_active_subscription,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Best-effort client IP from proxy headers.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// The `token` cookie is deliberately NOT HttpOnly: the browser extension
/// reads it to bootstrap its own token storage.
fn session_cookie(token: &str, expiry_days: i64) -> String {
    let max_age = expiry_days * 24 * 60 * 60;
    format!("token={token}; Path=/; Max-Age={max_age}; SameSite=Lax")
}

fn clear_session_cookie() -> String {
    "token=; Path=/; Max-Age=0; SameSite=Lax".to_string()
}
