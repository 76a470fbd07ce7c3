//! Integration tests for ad-hoc and saved query execution against a local
//! upstream stub.

mod common;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use common::{body_json, build_test_app, post_json, spawn_upstream};
use serde_json::{json, Value};

/// Upstream stub with a handful of canned endpoints.
fn upstream() -> Router {
    Router::new()
        .route(
            "/items",
            get(|| async {
                Json(json!({ "items": [
                    { "name": "alpha", "active": true, "score": 3 },
                    { "name": "beta", "active": false, "score": 5 },
                    { "name": "gamma", "active": true, "score": 8 },
                ]}))
            }),
        )
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/text", get(|| async { "plain text" }))
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .route(
            "/echo",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let token = headers
                    .get("x-api-key")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                Json(json!({ "received": body, "apiKey": token }))
            }),
        )
}

#[tokio::test]
async fn execute_returns_upstream_json() {
    let base = spawn_upstream(upstream()).await;
    let app = build_test_app();

    let response = post_json(app, "/api/execute", json!({ "url": format!("{base}/items") })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn execute_applies_transform() {
    let base = spawn_upstream(upstream()).await;
    let app = build_test_app();

    let response = post_json(
        app,
        "/api/execute",
        json!({
            "url": format!("{base}/items"),
            "transform": "response.items.filter(i => i.active).map(i => i.name)",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(["alpha", "gamma"]));
}

#[tokio::test]
async fn execute_sends_headers_and_json_body() {
    let base = spawn_upstream(upstream()).await;
    let app = build_test_app();

    let response = post_json(
        app,
        "/api/execute",
        json!({
            "url": format!("{base}/echo"),
            "method": "POST",
            "headers": { "x-api-key": "k-123" },
            "body": "{\"hello\": \"world\"}",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["received"], json!({ "hello": "world" }));
    assert_eq!(json["apiKey"], "k-123");
}

#[tokio::test]
async fn non_json_and_empty_bodies_are_passed_through() {
    let base = spawn_upstream(upstream()).await;
    let app = build_test_app();

    let response = post_json(app.clone(), "/api/execute", json!({ "url": format!("{base}/text") })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!("plain text"));

    let response = post_json(app, "/api/execute", json!({ "url": format!("{base}/empty") })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, Value::Null);
}

#[tokio::test]
async fn upstream_404_propagates() {
    let base = spawn_upstream(upstream()).await;
    let app = build_test_app();

    let response = post_json(app, "/api/execute", json!({ "url": format!("{base}/missing") })).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["statusCode"], 404);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert!(json["message"].as_str().unwrap().contains("404 Not Found"));
}

#[tokio::test]
async fn unreachable_host_returns_500_request_failed() {
    let app = build_test_app();

    // Bind then drop a listener so the port is known to be closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let response = post_json(app, "/api/execute", json!({ "url": format!("http://{addr}/") })).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["code"], "REQUEST_FAILED");
    assert!(json["message"].as_str().unwrap().starts_with("Request failed:"));
}

#[tokio::test]
async fn missing_url_returns_400() {
    let app = build_test_app();

    let response = post_json(app, "/api/execute", json!({ "method": "GET" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "URL is required");
}

#[tokio::test]
async fn transform_syntax_error_returns_400() {
    let base = spawn_upstream(upstream()).await;
    let app = build_test_app();

    let response = post_json(
        app,
        "/api/execute",
        json!({ "url": format!("{base}/items"), "transform": "syntax((" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Transform error: SyntaxError"), "{message}");
}

#[tokio::test]
async fn transform_runtime_error_returns_400() {
    let base = spawn_upstream(upstream()).await;
    let app = build_test_app();

    let response = post_json(
        app,
        "/api/execute",
        json!({ "url": format!("{base}/items"), "transform": "response.nothing.here" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = body_json(response).await["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Transform error: TypeError"), "{message}");
}

#[tokio::test]
async fn saved_query_executes_with_its_transform() {
    let base = spawn_upstream(upstream()).await;
    let app = build_test_app();

    let created = post_json(
        app.clone(),
        "/api/queries",
        json!({
            "name": "Top score",
            "url": format!("{base}/items"),
            "transform": "Math.max(...response.items.map(i => i.score))",
        }),
    )
    .await;
    let id = body_json(created).await["id"].as_str().unwrap().to_string();

    let response = post_json(app, &format!("/api/queries/{id}/execute"), json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(8));
}

#[tokio::test]
async fn executing_a_missing_saved_query_returns_404() {
    let app = build_test_app();

    let response = post_json(app, "/api/queries/nope/execute", json!({})).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Query not found");
}
