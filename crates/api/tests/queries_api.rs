//! HTTP-level integration tests for saved query CRUD.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, create_query, delete, get, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_query_returns_201_with_defaults() {
    let app = build_test_app();

    let response = post_json(
        app,
        "/api/queries",
        json!({ "name": "Users", "url": "https://example.com/users" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["id"].is_string());
    assert_eq!(json["name"], "Users");
    assert_eq!(json["method"], "GET");
    assert_eq!(json["headers"], json!({}));
    assert_eq!(json["body"], "");
    assert_eq!(json["transform"], "");
    assert_eq!(json["display"], json!({ "type": "raw" }));
    assert_eq!(json["createdAt"], json["updatedAt"]);
}

#[tokio::test]
async fn create_query_without_url_returns_400() {
    let app = build_test_app();

    let response = post_json(app, "/api/queries", json!({ "name": "Users" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["statusCode"], 400);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["message"], "Name and URL are required");
}

#[tokio::test]
async fn create_query_with_unknown_method_returns_400() {
    let app = build_test_app();

    let response = post_json(
        app,
        "/api/queries",
        json!({ "name": "Users", "url": "https://example.com", "method": "PATCH" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_query_round_trips() {
    let app = build_test_app();
    let created = create_query(app.clone(), "Users", "https://example.com/users").await;
    let id = created["id"].as_str().unwrap();

    let response = get(app, &format!("/api/queries/{id}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[tokio::test]
async fn get_missing_query_returns_404() {
    let app = build_test_app();

    let response = get(app, "/api/queries/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["statusCode"], 404);
    assert_eq!(json["message"], "Query not found");
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_queries_newest_updated_first() {
    let app = build_test_app();
    let first = create_query(app.clone(), "First", "https://example.com/1").await;
    let second = create_query(app.clone(), "Second", "https://example.com/2").await;

    // Touching the first query moves it to the front.
    let id = first["id"].as_str().unwrap();
    let response = put_json(
        app.clone(),
        &format!("/api/queries/{id}"),
        json!({ "name": "First (edited)" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(app, "/api/queries").await).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["First (edited)", second["name"].as_str().unwrap()]);
}

#[tokio::test]
async fn list_queries_starts_empty() {
    let app = build_test_app();
    let json = body_json(get(app, "/api/queries").await).await;
    assert_eq!(json, json!([]));
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_query_merges_fields() {
    let app = build_test_app();
    let created = post_json(
        app.clone(),
        "/api/queries",
        json!({
            "name": "Users",
            "url": "https://example.com/users",
            "transform": "response.items",
        }),
    )
    .await;
    let created = body_json(created).await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(
        app,
        &format!("/api/queries/{id}"),
        json!({ "name": "X", "id": "ignored", "createdAt": "1999-01-01T00:00:00Z" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["name"], "X");
    assert_eq!(json["id"], created["id"]);
    assert_eq!(json["url"], created["url"]);
    assert_eq!(json["transform"], "response.items");
    assert_eq!(json["createdAt"], created["createdAt"]);
    assert_ne!(json["updatedAt"], created["updatedAt"]);
}

#[tokio::test]
async fn update_missing_query_returns_404() {
    let app = build_test_app();

    let response = put_json(app, "/api/queries/nope", json!({ "name": "X" })).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_query_with_blank_name_returns_400() {
    let app = build_test_app();
    let created = create_query(app.clone(), "Users", "https://example.com").await;
    let id = created["id"].as_str().unwrap();

    let response = put_json(app, &format!("/api/queries/{id}"), json!({ "name": "  " })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_query_then_get_returns_404() {
    let app = build_test_app();
    let created = create_query(app.clone(), "Users", "https://example.com").await;
    let uri = format!("/api/queries/{}", created["id"].as_str().unwrap());

    let response = delete(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "success": true }));

    let response = get(app.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(app, &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
