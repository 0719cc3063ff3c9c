//! Integration tests for the per-user notification inbox.

mod common;

use atelier_core::roles::ROLE_AGENCY_ID;
use atelier_db::models::notification::NewNotification;
use atelier_db::repositories::NotificationRepo;
use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json_auth, user_with_token};
use serde_json::json;
use sqlx::PgPool;

async fn seed(pool: &PgPool, user_id: i64, title: &str) -> i64 {
    NotificationRepo::create(
        pool,
        &NewNotification {
            user_id,
            kind: "prescription.commented".to_string(),
            title: title.to_string(),
            body: None,
            project_id: None,
            entity_type: None,
            entity_id: None,
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unread_count_and_mark_read(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user, token) = user_with_token(&app, &pool, "me@test.com", ROLE_AGENCY_ID).await;
    let first = seed(&pool, user.id, "one").await;
    seed(&pool, user.id, "two").await;

    let count = body_json(get_auth(app.clone(), "/api/v1/notifications/unread-count", &token).await).await;
    assert_eq!(count["data"]["count"], 2);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/notifications/{first}/read"),
        json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let unread = body_json(get_auth(app.clone(), "/api/v1/notifications?unread_only=true", &token).await).await;
    let unread = unread["data"].as_array().unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0]["title"], "two");

    let marked = body_json(post_json_auth(app.clone(), "/api/v1/notifications/read-all", json!({}), &token).await).await;
    assert_eq!(marked["data"]["marked_read"], 1);

    let count = body_json(get_auth(app, "/api/v1/notifications/unread-count", &token).await).await;
    assert_eq!(count["data"]["count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_respects_limit(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user, token) = user_with_token(&app, &pool, "me@test.com", ROLE_AGENCY_ID).await;
    for i in 0..5 {
        seed(&pool, user.id, &format!("n{i}")).await;
    }

    let page = body_json(get_auth(app, "/api/v1/notifications?limit=2&offset=1", &token).await).await;

    assert_eq!(page["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_users_notifications_are_not_found(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _owner_token) = user_with_token(&app, &pool, "owner@test.com", ROLE_AGENCY_ID).await;
    let (_other, other_token) = user_with_token(&app, &pool, "other@test.com", ROLE_AGENCY_ID).await;
    let id = seed(&pool, owner.id, "private").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/notifications/{id}/read"),
        json!({}),
        &other_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(app, &format!("/api/v1/notifications/{id}"), &other_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_removes_notification(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user, token) = user_with_token(&app, &pool, "me@test.com", ROLE_AGENCY_ID).await;
    let id = seed(&pool, user.id, "bye").await;

    let response = delete_auth(app.clone(), &format!("/api/v1/notifications/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let list = body_json(get_auth(app, "/api/v1/notifications", &token).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}
