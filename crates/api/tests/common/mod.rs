//! Shared helpers for HTTP-level integration tests.
//!
//! `build_test_app` reuses the production router builder so tests exercise
//! the exact middleware stack the binary runs.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use knox_api::auth::jwt::JwtConfig;
use knox_api::auth::password::hash_password;
use knox_api::config::ServerConfig;
use knox_api::router::build_app_router;
use knox_api::state::AppState;
use knox_core::types::DbId;
use knox_db::models::user::{CreateUser, User};
use knox_db::repositories::UserRepo;

/// The plaintext password every test user gets.
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_expiry_mins: 15,
        },
        session_expiry_days: 7,
        login_max_failures: 5,
        login_window_mins: 15,
        renewal_grace_days: 7,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, "GET", uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "GET", uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, "POST", uri, Some(body), None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, "POST", uri, Some(body), Some(token)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "POST", uri, None, Some(token)).await
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

/// Create a user directly in the database with [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, email: &str, admin: bool) -> User {
    let hashed = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: email.split('@').next().unwrap().to_string(),
            email: email.to_string(),
            password_hash: hashed,
        },
    )
    .await
    .expect("user creation should succeed");

    if admin {
        sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1")
            .bind(user.id)
            .execute(pool)
            .await
            .expect("admin flag update should succeed");
    }

    UserRepo::find_by_id(pool, user.id)
        .await
        .expect("user reload should succeed")
        .expect("user must exist")
}

/// Sign a user in via the API and return the bearer token.
pub async fn signin(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(app, "/api/v1/auth/signin", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK, "signin must succeed");
    let json = body_json(response).await;
    json["data"]["token"].as_str().expect("token in response").to_string()
}

/// Seeded catalog fixture ids.
pub struct Catalog {
    pub basic_plan: DbId,
    pub pro_plan: DbId,
    pub netflix: DbId,
    pub spotify: DbId,
    /// Inactive service mapped into the basic plan.
    pub retired: DbId,
    /// Active service inside an inactive group, mapped into the basic plan.
    pub archived: DbId,
}

/// Seed a small catalog:
///
/// - group "Streaming" (active): category "Video" with `netflix` (active)
///   and `retired` (inactive); category "Music" with `spotify` (active)
/// - group "Legacy" (inactive): category "Old" with `archived` (active)
/// - plan "Basic" maps netflix + retired + archived; plan "Pro" maps
///   netflix + spotify
pub async fn seed_catalog(pool: &PgPool) -> Catalog {
    let streaming: DbId = sqlx::query_scalar(
        "INSERT INTO service_groups (name) VALUES ('Streaming') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    let legacy: DbId = sqlx::query_scalar(
        "INSERT INTO service_groups (name, is_active) VALUES ('Legacy', FALSE) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    let video: DbId = sqlx::query_scalar(
        "INSERT INTO service_categories (name, group_id) VALUES ('Video', $1) RETURNING id",
    )
    .bind(streaming)
    .fetch_one(pool)
    .await
    .unwrap();
    let music: DbId = sqlx::query_scalar(
        "INSERT INTO service_categories (name, group_id) VALUES ('Music', $1) RETURNING id",
    )
    .bind(streaming)
    .fetch_one(pool)
    .await
    .unwrap();
    let old: DbId = sqlx::query_scalar(
        "INSERT INTO service_categories (name, group_id) VALUES ('Old', $1) RETURNING id",
    )
    .bind(legacy)
    .fetch_one(pool)
    .await
    .unwrap();

    let netflix_cookies = serde_json::json!([{
        "name": "NetflixId",
        "value": "sample_value",
        "domain": ".netflix.com",
        "path": "/",
        "secure": true,
        "httpOnly": false
    }]);
    let spotify_cookies = serde_json::json!([{
        "name": "sp_dc",
        "value": "sample_value",
        "domain": ".spotify.com",
        "path": "/",
        "secure": true,
        "httpOnly": true,
        "sameSite": "lax"
    }]);

    let netflix: DbId = sqlx::query_scalar(
        "INSERT INTO services (code, name, category_id, cookie_data)
         VALUES ('netflix', 'Netflix Premium', $1, $2) RETURNING id",
    )
    .bind(video)
    .bind(&netflix_cookies)
    .fetch_one(pool)
    .await
    .unwrap();
    let retired: DbId = sqlx::query_scalar(
        "INSERT INTO services (code, name, category_id, is_active)
         VALUES ('retired', 'Retired Service', $1, FALSE) RETURNING id",
    )
    .bind(video)
    .fetch_one(pool)
    .await
    .unwrap();
    let spotify: DbId = sqlx::query_scalar(
        "INSERT INTO services (code, name, category_id, cookie_data)
         VALUES ('spotify', 'Spotify Premium', $1, $2) RETURNING id",
    )
    .bind(music)
    .bind(&spotify_cookies)
    .fetch_one(pool)
    .await
    .unwrap();
    let archived: DbId = sqlx::query_scalar(
        "INSERT INTO services (code, name, category_id)
         VALUES ('archived', 'Archived Service', $1) RETURNING id",
    )
    .bind(old)
    .fetch_one(pool)
    .await
    .unwrap();

    let basic_plan: DbId = sqlx::query_scalar(
        "INSERT INTO plans (name, price, duration_in_days) VALUES ('Basic', 10000, 7) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    let pro_plan: DbId = sqlx::query_scalar(
        "INSERT INTO plans (name, price, duration_in_days) VALUES ('Pro', 20000, 30) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    for (plan, service) in [
        (basic_plan, netflix),
        (basic_plan, retired),
        (basic_plan, archived),
        (pro_plan, netflix),
        (pro_plan, spotify),
    ] {
        sqlx::query("INSERT INTO plan_services (plan_id, service_id) VALUES ($1, $2)")
            .bind(plan)
            .bind(service)
            .execute(pool)
            .await
            .unwrap();
    }

    Catalog {
        basic_plan,
        pro_plan,
        netflix,
        spotify,
        retired,
        archived,
    }
}

/// Give a user an active subscription to `plan_id`.
pub async fn activate_subscription(pool: &PgPool, user_id: DbId, plan_id: DbId, days: i32) {
    knox_db::repositories::SubscriptionRepo::activate(pool, user_id, plan_id, days)
        .await
        .expect("activation should succeed");
}

/// Push a user's subscription window into the past, leaving `status` at
/// `active` so the lazy flip still has work to do.
pub async fn backdate_subscription(pool: &PgPool, user_id: DbId) {
    sqlx::query(
        "UPDATE subscriptions SET ends_at = NOW() - INTERVAL '1 day', status = 'active'
         WHERE user_id = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await
    .expect("backdate should succeed");
}
