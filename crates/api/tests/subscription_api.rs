//! HTTP-level integration tests for the subscription state machine:
//! purchase orders, the payment callback transition, lazy expiry, the
//! renewal grace gate, and the admin sweep.

mod common;

use axum::http::StatusCode;
use common::{
    activate_subscription, backdate_subscription, body_json, create_test_user, get, get_auth,
    post_auth, post_json, post_json_auth, seed_catalog, signin,
};
use knox_core::types::DbId;
use sqlx::PgPool;

async fn place_order(app: axum::Router, token: &str, plan_id: DbId) -> serde_json::Value {
    let body = serde_json::json!({ "plan_id": plan_id });
    let response = post_json_auth(app, "/api/v1/subscriptions", body, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

fn callback_body(order_id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({ "order_id": order_id, "status": status })
}

/// The plans listing is public and only shows active plans.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_plans_public(pool: PgPool) {
    seed_catalog(&pool).await;
    sqlx::query(
        "INSERT INTO plans (name, price, duration_in_days, is_active)
         VALUES ('Discontinued', 5000, 7, FALSE)",
    )
    .execute(&pool)
    .await
    .unwrap();
    let app = common::build_test_app(pool);

    let response = get(app, "/api/v1/plans").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Basic", "Pro"]);
}

/// A settled payment activates the subscription and mirrors the cached
/// user fields.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_payment_callback_activates(pool: PgPool) {
    let catalog = seed_catalog(&pool).await;
    let user = create_test_user(&pool, "payer@test.com", false).await;
    let app = common::build_test_app(pool.clone());

    let token = signin(app.clone(), "payer@test.com").await;
    let order = place_order(app.clone(), &token, catalog.pro_plan).await;
    let order_id = order["data"]["order_id"].as_str().unwrap();
    assert_eq!(order["data"]["amount"], 20000);

    let response = post_json(
        app.clone(),
        "/api/v1/payments/callback",
        callback_body(order_id, "success"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Entitlement state flipped to active.
    let response = get_auth(app, "/api/v1/subscriptions/status", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["has_active_subscription"], true);
    assert_eq!(json["data"]["subscription"]["status"], "active");
    assert_eq!(json["data"]["plan"]["name"], "Pro");

    // Cached projection mirrored in the same transaction.
    let cached_plan: Option<DbId> =
        sqlx::query_scalar("SELECT current_plan_id FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(cached_plan, Some(catalog.pro_plan));

    // The order is settled.
    let status: String =
        sqlx::query_scalar("SELECT status FROM transactions WHERE order_id = $1")
            .bind(order_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "success");
}

/// A failed payment settles the order without touching entitlements.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_payment_callback_failure(pool: PgPool) {
    let catalog = seed_catalog(&pool).await;
    create_test_user(&pool, "declined@test.com", false).await;
    let app = common::build_test_app(pool.clone());

    let token = signin(app.clone(), "declined@test.com").await;
    let order = place_order(app.clone(), &token, catalog.basic_plan).await;
    let order_id = order["data"]["order_id"].as_str().unwrap();

    let response = post_json(
        app.clone(),
        "/api/v1/payments/callback",
        callback_body(order_id, "failed"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, "/api/v1/subscriptions/status", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["has_active_subscription"], false);
    assert!(json["data"]["subscription"].is_null());
}

/// Gateways retry callbacks: a replay of a settled order is acknowledged
/// without re-activating.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_payment_callback_replay(pool: PgPool) {
    let catalog = seed_catalog(&pool).await;
    let user = create_test_user(&pool, "retried@test.com", false).await;
    let app = common::build_test_app(pool.clone());

    let token = signin(app.clone(), "retried@test.com").await;
    let order = place_order(app.clone(), &token, catalog.basic_plan).await;
    let order_id = order["data"]["order_id"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/v1/payments/callback",
        callback_body(&order_id, "success"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let first_ends_at: chrono::DateTime<chrono::Utc> =
        sqlx::query_scalar("SELECT ends_at FROM subscriptions WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();

    let response = post_json(
        app,
        "/api/v1/payments/callback",
        callback_body(&order_id, "success"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "already_settled");

    let second_ends_at: chrono::DateTime<chrono::Utc> =
        sqlx::query_scalar("SELECT ends_at FROM subscriptions WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(first_ends_at, second_ends_at);
}

/// A callback for an unknown order is a 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_payment_callback_unknown_order(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/payments/callback",
        callback_body("SUB-0-nonexistent", "success"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// While a subscription is active and far from expiry, a new purchase is
/// refused; within the grace horizon it is allowed.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_renewal_grace_gate(pool: PgPool) {
    let catalog = seed_catalog(&pool).await;
    let user = create_test_user(&pool, "renewer@test.com", false).await;
    activate_subscription(&pool, user.id, catalog.pro_plan, 30).await;
    let app = common::build_test_app(pool.clone());

    let token = signin(app.clone(), "renewer@test.com").await;

    // 30 days out: blocked.
    let body = serde_json::json!({ "plan_id": catalog.pro_plan });
    let response = post_json_auth(app.clone(), "/api/v1/subscriptions", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // 2 days out: inside the 7-day grace horizon, allowed.
    sqlx::query(
        "UPDATE subscriptions SET ends_at = NOW() + INTERVAL '2 days' WHERE user_id = $1",
    )
    .bind(user.id)
    .execute(&pool)
    .await
    .unwrap();
    let order = place_order(app, &token, catalog.pro_plan).await;
    assert!(order["data"]["order_id"].as_str().unwrap().starts_with("SUB-"));
}

/// Renewal after expiry reuses the existing row: same id, reset window,
/// status back to active.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_renewal_reuses_row(pool: PgPool) {
    let catalog = seed_catalog(&pool).await;
    let user = create_test_user(&pool, "lapsed@test.com", false).await;
    activate_subscription(&pool, user.id, catalog.basic_plan, 7).await;
    backdate_subscription(&pool, user.id).await;

    let original_id: DbId =
        sqlx::query_scalar("SELECT id FROM subscriptions WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();

    let app = common::build_test_app(pool.clone());
    let token = signin(app.clone(), "lapsed@test.com").await;
    let order = place_order(app.clone(), &token, catalog.pro_plan).await;
    let order_id = order["data"]["order_id"].as_str().unwrap();

    let response = post_json(
        app.clone(),
        "/api/v1/payments/callback",
        callback_body(order_id, "success"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (id, status, plan_id): (DbId, String, DbId) = sqlx::query_as(
        "SELECT id, status, plan_id FROM subscriptions WHERE user_id = $1",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(id, original_id, "renewal must update, not replace, the row");
    assert_eq!(status, "active");
    assert_eq!(plan_id, catalog.pro_plan);
}

/// The status read performs the lazy expiry flip.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_status_lazy_flip(pool: PgPool) {
    let catalog = seed_catalog(&pool).await;
    let user = create_test_user(&pool, "overdue@test.com", false).await;
    activate_subscription(&pool, user.id, catalog.basic_plan, 7).await;
    backdate_subscription(&pool, user.id).await;
    let app = common::build_test_app(pool.clone());

    let token = signin(app.clone(), "overdue@test.com").await;
    let response = get_auth(app, "/api/v1/subscriptions/status", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["has_active_subscription"], false);
    assert_eq!(json["data"]["subscription"]["status"], "expired");

    let cached: Option<DbId> =
        sqlx::query_scalar("SELECT current_plan_id FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(cached, None);
}

/// The sweep is admin-only and flips every overdue row in one pass.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_expire_sweep(pool: PgPool) {
    let catalog = seed_catalog(&pool).await;
    let overdue_a = create_test_user(&pool, "a@test.com", false).await;
    let overdue_b = create_test_user(&pool, "b@test.com", false).await;
    let healthy = create_test_user(&pool, "c@test.com", false).await;
    for user in [&overdue_a, &overdue_b] {
        activate_subscription(&pool, user.id, catalog.basic_plan, 7).await;
        backdate_subscription(&pool, user.id).await;
    }
    activate_subscription(&pool, healthy.id, catalog.pro_plan, 30).await;
    create_test_user(&pool, "admin@test.com", true).await;
    let app = common::build_test_app(pool.clone());

    // Non-admin is refused.
    let token = signin(app.clone(), "c@test.com").await;
    let response = post_auth(app.clone(), "/api/v1/subscriptions/expire-sweep", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = signin(app.clone(), "admin@test.com").await;
    let response =
        post_auth(app, "/api/v1/subscriptions/expire-sweep", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["expired_count"], 2);

    let active_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM subscriptions WHERE status = 'active'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(active_count, 1);
}

/// Ordering an unknown or inactive plan is a 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_order_unknown_plan(pool: PgPool) {
    seed_catalog(&pool).await;
    create_test_user(&pool, "shopper@test.com", false).await;
    let app = common::build_test_app(pool);

    let token = signin(app.clone(), "shopper@test.com").await;
    let body = serde_json::json!({ "plan_id": 999_999 });
    let response = post_json_auth(app, "/api/v1/subscriptions", body, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
