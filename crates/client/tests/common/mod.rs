#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use fetchboard_api::auth::session::{issue_session_token, SessionConfig};
use fetchboard_api::config::{AuthConfig, LogFormat, ServerConfig};
use fetchboard_api::executor::Executor;
use fetchboard_api::router::build_app_router;
use fetchboard_api::state::AppState;
use fetchboard_client::ApiClient;
use fetchboard_core::identity::Identity;
use fetchboard_core::transform::TransformLimits;

const TEST_SECRET: &str = "client-test-secret-long-enough-for-hmac";

fn config(auth: AuthConfig) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        execute_timeout_secs: 5,
        auth,
        auth_login_url: None,
        transform_limits: TransformLimits::default(),
        log_format: LogFormat::Text,
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_with(config: ServerConfig) -> String {
    let executor = Executor::new(
        Duration::from_secs(config.execute_timeout_secs),
        config.transform_limits,
    )
    .unwrap();
    let state = AppState {
        store: fetchboard_db::memory_store(),
        config: Arc::new(config.clone()),
        executor: Arc::new(executor),
    };
    serve(build_app_router(state, &config)).await
}

/// A placeholder-auth server over a fresh store, plus a client for it.
pub async fn spawn_server() -> ApiClient {
    let base = spawn_with(config(AuthConfig::Placeholder {
        user_id: "local".into(),
    }))
    .await;
    ApiClient::new(base)
}

/// A session-auth server; returns its base URL and a token minter.
pub async fn spawn_session_server() -> (String, impl Fn(&str) -> String) {
    let session = SessionConfig {
        secret: TEST_SECRET.into(),
        ttl_hours: 1,
    };
    let base = spawn_with(config(AuthConfig::Session(session.clone()))).await;
    let mint = move |user_id: &str| issue_session_token(&Identity::new(user_id), &session).unwrap();
    (base, mint)
}
