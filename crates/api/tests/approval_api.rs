//! Integration tests for the approval workflow, including first-come
//! first-served arbitration between racing decisions.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, seed_user};
use serde_json::json;
use sqlx::PgPool;

fn furniture_ticket() -> serde_json::Value {
    json!({
        "title": "Standing desks for the design team",
        "description": "Six electric standing desks",
        "category": "office_furniture",
        "priority": "high",
        "estimated_cost": 15_000_000
    })
}

async fn create_ticket(
    app: &axum::Router,
    token: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let response = post_json_auth(app.clone(), "/api/v1/tickets", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Entering approval
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn furniture_ticket_starts_waiting_approval(pool: PgPool) {
    let (_, token) = seed_user(&pool, "requester").await;
    let app = common::build_test_app(pool.clone());

    let json = create_ticket(&app, &token, furniture_ticket()).await;
    assert_eq!(json["data"]["status"], "waiting_approval");
    assert_eq!(json["data"]["requires_approval"], true);

    // A pending approval record is created in the same transaction.
    let pending: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM ticket_approvals WHERE ticket_id = $1::uuid AND status = 'pending'",
    )
    .bind(json["data"]["id"].as_str().unwrap())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(pending, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn threshold_is_inclusive(pool: PgPool) {
    let (_, token) = seed_user(&pool, "requester").await;
    let app = common::build_test_app(pool);

    let json = create_ticket(
        &app,
        &token,
        json!({
            "title": "Pantry restock",
            "description": "Coffee and snacks",
            "category": "pantry_supplies",
            "priority": "low",
            "estimated_cost": 500_000
        }),
    )
    .await;
    assert_eq!(json["data"]["status"], "waiting_approval");
    assert_eq!(json["data"]["requires_approval"], true);
}

// ---------------------------------------------------------------------------
// Deciding
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn approver_approves_waiting_ticket(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let (approver_id, approver_token) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool.clone());

    let json = create_ticket(&app, &requester_token, furniture_ticket()).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app,
        &format!("/api/v1/tickets/{id}/approve"),
        &approver_token,
        json!({ "notes": "Within this quarter's budget" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let data = body_json(response).await;
    assert_eq!(data["data"]["status"], "approved");

    let (status, resolved_by): (String, Option<uuid::Uuid>) = sqlx::query_as(
        "SELECT status, approver_id FROM ticket_approvals WHERE ticket_id = $1::uuid",
    )
    .bind(&id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(status, "approved");
    assert_eq!(resolved_by, Some(approver_id));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rejection_requires_a_reason(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let (_, approver_token) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool);

    let json = create_ticket(&app, &requester_token, furniture_ticket()).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app,
        &format!("/api/v1/tickets/{id}/reject"),
        &approver_token,
        json!({ "reason": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn second_decision_observes_conflict(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let (_, first_approver) = seed_user(&pool, "approver").await;
    let (_, second_approver) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool);

    let json = create_ticket(&app, &requester_token, furniture_ticket()).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let first = post_json_auth(
        app.clone(),
        &format!("/api/v1/tickets/{id}/approve"),
        &first_approver,
        json!({}),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    // The loser gets an explicit conflict, never a silent overwrite.
    let second = post_json_auth(
        app.clone(),
        &format!("/api/v1/tickets/{id}/reject"),
        &second_approver,
        json!({ "reason": "Too expensive" }),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["code"], "APPROVAL_CONFLICT");

    // The committed decision stands.
    let reloaded = get_auth(app, &format!("/api/v1/tickets/{id}"), &first_approver).await;
    let data = body_json(reloaded).await;
    assert_eq!(data["data"]["status"], "approved");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn racing_decisions_commit_exactly_once(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let (_, first_approver) = seed_user(&pool, "approver").await;
    let (_, second_approver) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool.clone());

    let json = create_ticket(&app, &requester_token, furniture_ticket()).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    // Opposite decisions dispatched concurrently, both hydrated from the
    // same pre-decision state.
    let approve_path = format!("/api/v1/tickets/{id}/approve");
    let reject_path = format!("/api/v1/tickets/{id}/reject");
    let approve = post_json_auth(app.clone(), &approve_path, &first_approver, json!({}));
    let reject = post_json_auth(
        app.clone(),
        &reject_path,
        &second_approver,
        json!({ "reason": "Over budget" }),
    );
    let (approve_response, reject_response) = tokio::join!(approve, reject);

    let statuses = [approve_response.status(), reject_response.status()];
    assert!(statuses.contains(&StatusCode::OK), "one decision commits");
    assert!(
        statuses.contains(&StatusCode::CONFLICT),
        "the other decision conflicts"
    );

    let (winner, loser) = if approve_response.status() == StatusCode::OK {
        ("approved", reject_response)
    } else {
        ("rejected", approve_response)
    };
    let body = body_json(loser).await;
    assert_eq!(body["code"], "APPROVAL_CONFLICT");

    // The committed decision is the only one in the database.
    let ticket_status: String = sqlx::query_scalar("SELECT status FROM tickets WHERE id = $1::uuid")
        .bind(&id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(ticket_status, winner);

    let records: Vec<(String,)> =
        sqlx::query_as("SELECT status FROM ticket_approvals WHERE ticket_id = $1::uuid")
            .bind(&id)
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, winner);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn decision_survives_an_unrelated_version_bump(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let (_, approver_token) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool.clone());

    let json = create_ticket(&app, &requester_token, furniture_ticket()).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    // An open transaction bumps the version without deciding the ticket,
    // holding the row lock so the decision's guarded write queues behind
    // it and loses once it commits.
    let mut blocker = pool.begin().await.unwrap();
    sqlx::query("UPDATE tickets SET version = version + 1, updated_at = now() WHERE id = $1::uuid")
        .bind(&id)
        .execute(&mut *blocker)
        .await
        .unwrap();

    let race_app = app.clone();
    let race_id = id.clone();
    let race_token = approver_token.clone();
    let decision = tokio::spawn(async move {
        post_json_auth(
            race_app,
            &format!("/api/v1/tickets/{race_id}/approve"),
            &race_token,
            json!({}),
        )
        .await
    });

    // Give the decision time to load the old version and block on the
    // guarded write before the bump commits.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    blocker.commit().await.unwrap();

    // The ticket is still undecided after the bump, so the decision
    // re-reads and commits against the new version.
    let response = decision.await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await;
    assert_eq!(data["data"]["status"], "approved");
    assert_eq!(data["data"]["version"], 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deciding_a_ticket_that_needs_no_approval_conflicts(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let (_, approver_token) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool);

    let json = create_ticket(
        &app,
        &requester_token,
        json!({
            "title": "Whiteboard markers",
            "description": "A dozen, assorted colours",
            "category": "office_supplies",
            "priority": "low",
            "estimated_cost": 80_000
        }),
    )
    .await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app,
        &format!("/api/v1/tickets/{id}/approve"),
        &approver_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "APPROVAL_NOT_REQUIRED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn requester_cannot_decide(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let app = common::build_test_app(pool);

    let json = create_ticket(&app, &requester_token, furniture_ticket()).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app,
        &format!("/api/v1/tickets/{id}/approve"),
        &requester_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Queue and history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn pending_queue_lists_oldest_first_and_drains(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let (_, approver_token) = seed_user(&pool, "approver").await;
    let app = common::build_test_app(pool);

    let first = create_ticket(&app, &requester_token, furniture_ticket()).await;
    let _second = create_ticket(&app, &requester_token, furniture_ticket()).await;

    let queue = get_auth(app.clone(), "/api/v1/approvals/pending", &approver_token).await;
    assert_eq!(queue.status(), StatusCode::OK);
    let queue = body_json(queue).await;
    let items = queue["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0]["ticket_id"],
        first["data"]["id"],
        "oldest pending approval comes first"
    );

    let id = first["data"]["id"].as_str().unwrap();
    post_json_auth(
        app.clone(),
        &format!("/api/v1/tickets/{id}/approve"),
        &approver_token,
        json!({}),
    )
    .await;

    let queue = get_auth(app, "/api/v1/approvals/pending", &approver_token).await;
    let queue = body_json(queue).await;
    assert_eq!(queue["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approved_ticket_can_enter_fulfillment(pool: PgPool) {
    let (_, requester_token) = seed_user(&pool, "requester").await;
    let (_, approver_token) = seed_user(&pool, "approver").await;
    let (admin_id, admin_token) = seed_user(&pool, "admin").await;
    let app = common::build_test_app(pool);

    let json = create_ticket(&app, &requester_token, furniture_ticket()).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    post_json_auth(
        app.clone(),
        &format!("/api/v1/tickets/{id}/approve"),
        &approver_token,
        json!({}),
    )
    .await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/tickets/{id}/assign"),
        &admin_token,
        json!({ "admin_id": admin_id.to_string() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = body_json(response).await;
    assert_eq!(data["data"]["status"], "in_progress");
}
