#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use fetchboard_api::auth::session::{issue_session_token, SessionConfig};
use fetchboard_api::config::{AuthConfig, LogFormat, ServerConfig};
use fetchboard_api::executor::Executor;
use fetchboard_api::router::build_app_router;
use fetchboard_api::state::AppState;
use fetchboard_core::identity::Identity;
use fetchboard_core::transform::TransformLimits;
use fetchboard_db::SharedStore;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const TEST_ORIGIN: &str = "http://localhost:5173";

/// Build a test `ServerConfig` with safe defaults.
///
/// Placeholder auth as user `local`, `http://localhost:5173` as CORS origin
/// and short outbound timeouts.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![TEST_ORIGIN.to_string()],
        request_timeout_secs: 30,
        execute_timeout_secs: 5,
        auth: AuthConfig::Placeholder {
            user_id: "local".to_string(),
        },
        auth_login_url: None,
        transform_limits: TransformLimits::default(),
        log_format: LogFormat::Text,
    }
}

pub fn session_config() -> SessionConfig {
    SessionConfig {
        secret: TEST_SECRET.to_string(),
        ttl_hours: 1,
    }
}

/// Build the full application router over `store` with `config`.
///
/// Uses the same [`build_app_router`] as `main.rs` so integration tests
/// exercise the production middleware stack.
pub fn build_app(store: SharedStore, config: ServerConfig) -> Router {
    let executor = Executor::new(
        Duration::from_secs(config.execute_timeout_secs),
        config.transform_limits,
    )
    .expect("HTTP client should build");

    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        executor: Arc::new(executor),
    };
    build_app_router(state, &config)
}

/// Placeholder-auth app over a fresh store.
pub fn build_test_app() -> Router {
    build_app(fetchboard_db::memory_store(), test_config())
}

/// Session-auth app over `store`.
pub fn build_session_app(store: SharedStore) -> Router {
    let config = ServerConfig {
        auth: AuthConfig::Session(session_config()),
        ..test_config()
    };
    build_app(store, config)
}

/// Mint a session token for `user_id` signed with [`TEST_SECRET`].
pub fn token_for(user_id: &str) -> String {
    issue_session_token(&Identity::new(user_id), &session_config())
        .expect("token should be issued")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(token)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a query through the API and return its JSON.
pub async fn create_query(app: Router, name: &str, url: &str) -> serde_json::Value {
    let response = post_json(
        app,
        "/api/queries",
        serde_json::json!({ "name": name, "url": url }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Upstream stub
// ---------------------------------------------------------------------------

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
