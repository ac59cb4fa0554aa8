//! Shared helpers for the server test suites.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use user_directory_server::{AppState, app, db};

/// Fresh in-memory database with the schema applied.
pub async fn test_pool() -> SqlitePool {
    let pool = db::create_pool(&SecretString::from("sqlite::memory:"))
        .await
        .expect("Failed to create in-memory pool");
    db::run_migrations(&pool)
        .await
        .expect("Failed to apply schema");
    pool
}

/// The full application wired to a fresh database.
pub async fn test_app() -> Router {
    app(AppState::new(test_pool().await))
}

/// The full application over a database file, with the same pool settings as
/// production. Keep the `TempDir` alive for as long as the router is used.
pub async fn file_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("directory.db").display());

    let pool = db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to create file pool");
    db::run_migrations(&pool)
        .await
        .expect("Failed to apply schema");

    (dir, app(AppState::new(pool)))
}

/// Send a request and decode the JSON response body (`Null` when empty or not JSON).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Create a user through the API and return its id.
pub async fn create_user(app: &Router, username: &str, email: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(serde_json::json!({"username": username, "email": email})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["id"].as_i64().unwrap()
}
