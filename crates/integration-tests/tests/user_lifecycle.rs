//! Full create/list/fetch/update/delete flows over real HTTP.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use user_directory_integration_tests::TestContext;

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_user_lifecycle() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/users"))
        .json(&json!({"username": "alice", "email": "alice@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let alice: Value = resp.json().await.unwrap();
    let id = alice["id"].as_i64().unwrap();

    let resp = ctx.client.get(ctx.url("/users")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let list: Value = resp.json().await.unwrap();
    assert_eq!(list, json!([alice]));

    let resp = ctx
        .client
        .put(ctx.url(&format!("/users/{id}")))
        .json(&json!({"email": "alice@new.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(
        updated,
        json!({"id": id, "username": "alice", "email": "alice@new.com"})
    );

    let resp = ctx
        .client
        .get(ctx.url(&format!("/users/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.json::<Value>().await.unwrap(), updated);

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/users/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "status": "sukses",
            "pesan": format!("User alice (ID: {id}) telah dihapus.")
        })
    );

    let resp = ctx
        .client
        .get(ctx.url(&format!("/users/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_create_then_conflicting_update() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .post(ctx.url("/users"))
        .json(&json!([
            {"username": "a", "email": "a@x.com"},
            {"username": "b", "email": "b@x.com"},
            {"username": "a", "email": "dup@x.com"}
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(created.len(), 2);

    let a_id = created[0]["id"].as_i64().unwrap();
    let resp = ctx
        .client
        .put(ctx.url(&format!("/users/{a_id}")))
        .json(&json!({"username": "b"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"],
        "update failed, username or email may already be taken"
    );

    let resp = ctx.client.get(ctx.url("/users")).send().await.unwrap();
    let list: Vec<Value> = resp.json().await.unwrap();
    let names: Vec<&str> = list
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["a", "b"]);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_and_request_id() {
    let ctx = TestContext::new().await;

    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = ctx
        .client
        .get(ctx.url("/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
