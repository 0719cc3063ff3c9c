#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use atelier_api::auth::jwt::JwtConfig;
use atelier_api::auth::password::hash_password;
use atelier_api::config::ServerConfig;
use atelier_api::router::build_app_router;
use atelier_api::state::AppState;
use atelier_api::storage::LocalStorage;
use atelier_db::models::user::{CreateUser, User};
use atelier_db::repositories::UserRepo;
use atelier_events::{EventBus, EventPersistence};

/// Password given to every user made by [`create_test_user`].
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Upload limit used by the test app; small so oversize bodies are cheap.
pub const TEST_MAX_UPLOAD_BYTES: usize = 4 * 1024;

/// Build a test `ServerConfig` with safe defaults and a fresh upload dir.
pub fn test_config() -> ServerConfig {
    let upload_dir: PathBuf =
        std::env::temp_dir().join(format!("atelier-test-{}", uuid::Uuid::new_v4().simple()));

    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        upload_dir,
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router against `pool`.
///
/// Uses the same [`build_app_router`] as the binary and spawns the activity
/// log writer, so events land in the `events` table shortly after a request.
/// Must be called inside a Tokio runtime.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let event_bus = Arc::new(EventBus::default());
    tokio::spawn(EventPersistence::run(pool.clone(), event_bus.subscribe()));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
        mailer: None,
        storage: Arc::new(LocalStorage::new(config.upload_dir.clone())),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert a user directly and return the row. The password is [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, email: &str, role_id: i64) -> User {
    let input = CreateUser {
        email: email.to_string(),
        name: format!("User {email}"),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role_id,
        company_name: None,
        phone: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Log in through the API and return the access token.
pub async fn login_for_token(app: Router, email: &str, password: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login for {email} failed");
    let json = body_json(response).await;
    json["access_token"]
        .as_str()
        .expect("login response must carry access_token")
        .to_string()
}

/// Create a user with the given role and log them in.
pub async fn user_with_token(app: &Router, pool: &PgPool, email: &str, role_id: i64) -> (User, String) {
    let user = create_test_user(pool, email, role_id).await;
    let token = login_for_token(app.clone(), email, TEST_PASSWORD).await;
    (user, token)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

fn json_request(method: Method, uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    request(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::POST, uri, body, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, json_request(Method::PUT, uri, body, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token)).body(Body::empty()).unwrap()).await
}

/// POST a `multipart/form-data` body with one file part and optional text parts.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    file_name: &str,
    file_bytes: &[u8],
    text_fields: &[(&str, &str)],
    token: &str,
) -> Response<Body> {
    let boundary = "atelier-test-boundary";
    let mut body = Vec::new();
    for (name, value) in text_fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file_bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = request(Method::POST, uri, Some(token))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Domain fixtures (through the API)
// ---------------------------------------------------------------------------

fn created_id(json: &serde_json::Value) -> i64 {
    json["id"].as_i64().expect("created entity must carry an id")
}

/// Create a project owned by the token's user and return its id.
pub async fn create_project(app: &Router, token: &str, name: &str) -> i64 {
    let response =
        post_json_auth(app.clone(), "/api/v1/projects", serde_json::json!({ "name": name }), token).await;
    assert_eq!(response.status(), StatusCode::CREATED, "project creation failed");
    created_id(&body_json(response).await)
}

/// Assign an existing or new client by email.
pub async fn assign_client(
    app: &Router,
    token: &str,
    project_id: i64,
    email: &str,
    can_approve: bool,
) -> serde_json::Value {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/projects/{project_id}/clients"),
        serde_json::json!({ "email": email, "can_approve": can_approve }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "client assignment failed");
    body_json(response).await
}

pub async fn create_space(app: &Router, token: &str, project_id: i64, name: &str) -> i64 {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/projects/{project_id}/spaces"),
        serde_json::json!({ "name": name }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "space creation failed");
    created_id(&body_json(response).await)
}

pub async fn create_prescription(
    app: &Router,
    token: &str,
    space_id: i64,
    name: &str,
    quantity: i32,
    unit_price_cents: i64,
) -> i64 {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/spaces/{space_id}/prescriptions"),
        serde_json::json!({
            "name": name,
            "quantity": quantity,
            "unit_price_cents": unit_price_cents,
        }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "prescription creation failed");
    created_id(&body_json(response).await)
}
