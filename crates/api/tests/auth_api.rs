//! Integration tests for authentication and user management.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth, seed_user, TEST_PASSWORD};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn login_returns_token_and_user(pool: PgPool) {
    let (user_id, _) = seed_user(&pool, "requester").await;
    let app = common::build_test_app(pool.clone());

    let email: String = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_eq!(json["data"]["token_type"], "Bearer");
    assert_eq!(json["data"]["user"]["role"], "requester");
    // Credentials never leak into responses.
    assert!(json["data"]["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_wrong_password_fails(pool: PgPool) {
    let (user_id, _) = seed_user(&pool, "requester").await;
    let app = common::build_test_app(pool.clone());

    let email: String = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": "not-the-password" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_with_unknown_email_fails_identically(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "nobody@example.com", "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_user_cannot_log_in(pool: PgPool) {
    let (user_id, _) = seed_user(&pool, "requester").await;

    let email: String = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(&pool)
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": TEST_PASSWORD }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Current user + missing credentials
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn me_returns_own_profile(pool: PgPool) {
    let (user_id, token) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user_id.to_string());
    assert_eq!(json["data"]["role"], "approver");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/auth/me").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn garbage_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// User management (admin only)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_creates_user_who_can_log_in(pool: PgPool) {
    let (_, admin_token) = seed_user(&pool, "admin").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/users",
        &admin_token,
        json!({
            "employee_id": "EMP-1001",
            "name": "Dewi Lestari",
            "email": "dewi@example.com",
            "department": "Finance",
            "role": "approver",
            "password": "s3cure-enough"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["data"]["email"], "dewi@example.com");
    assert_eq!(created["data"]["is_active"], true);

    let login = post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": "dewi@example.com", "password": "s3cure-enough" }),
    )
    .await;
    assert_eq!(login.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn non_admin_cannot_create_users(pool: PgPool) {
    let (_, approver_token) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        &approver_token,
        json!({
            "employee_id": "EMP-1002",
            "name": "X",
            "email": "x@example.com",
            "role": "requester",
            "password": "s3cure-enough"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn weak_password_is_rejected(pool: PgPool) {
    let (_, admin_token) = seed_user(&pool, "admin").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/admin/users",
        &admin_token,
        json!({
            "employee_id": "EMP-1003",
            "name": "Y",
            "email": "y@example.com",
            "role": "requester",
            "password": "short"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_email_conflicts(pool: PgPool) {
    let (_, admin_token) = seed_user(&pool, "admin").await;
    let app = common::build_test_app(pool);

    let body = json!({
        "employee_id": "EMP-1004",
        "name": "Z",
        "email": "z@example.com",
        "role": "requester",
        "password": "s3cure-enough"
    });
    let first = post_json_auth(app.clone(), "/api/v1/admin/users", &admin_token, body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let mut second_body = body;
    second_body["employee_id"] = json!("EMP-1005");
    let second = post_json_auth(app, "/api/v1/admin/users", &admin_token, second_body).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivate_user_returns_no_content(pool: PgPool) {
    let (_, admin_token) = seed_user(&pool, "admin").await;
    let (victim_id, _) = seed_user(&pool, "requester").await;
    let app = common::build_test_app(pool.clone());

    let response =
        common::delete_auth(app, &format!("/api/v1/admin/users/{victim_id}"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let active: bool = sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
        .bind(victim_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!active);
}
