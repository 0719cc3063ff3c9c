//! Integration tests for the JSON error envelope and status code mapping.

mod common;

use atelier_core::roles::{ROLE_AGENCY_ID, ROLE_CLIENT_ID};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get, get_auth, post_json_auth, user_with_token};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_is_401_with_code(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/projects").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(json["error"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_401(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/projects", "not-a-jwt").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_project_is_404_not_found(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_agency, token) = user_with_token(&app, &pool, "agency@test.com", ROLE_AGENCY_ID).await;

    let response = get_auth(app, "/api/v1/projects/999999", &token).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn client_cannot_create_projects(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_client, token) = user_with_token(&app, &pool, "client@test.com", ROLE_CLIENT_ID).await;

    let response = post_json_auth(
        app,
        "/api/v1/projects",
        json!({ "name": "Not allowed" }),
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn malformed_json_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_agency, token) = user_with_token(&app, &pool, "agency@test.com", ROLE_AGENCY_ID).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/projects")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_project_name_is_validation_error(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_agency, token) = user_with_token(&app, &pool, "agency@test.com", ROLE_AGENCY_ID).await;

    let response = post_json_auth(app, "/api/v1/projects", json!({ "name": "   " }), &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}
