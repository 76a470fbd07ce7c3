//! Outbound HTTP execution of query definitions.
//!
//! [`Executor::execute`] issues the request described by an
//! [`ExecuteTarget`], decodes the response body as JSON and, when the target
//! carries a transform expression, evaluates it against the decoded body on
//! the blocking thread pool. There are no retries: the first failure is
//! returned.

use std::time::Duration;

use fetchboard_core::models::query::{ExecuteTarget, HttpMethod};
use fetchboard_core::transform::{self, TransformError, TransformLimits};
use serde_json::Value;

/// User-Agent sent on every outbound request.
pub const USER_AGENT: &str = concat!("fetchboard/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("URL is required")]
    MissingUrl,

    /// Transport fault or unusable request (bad URL, DNS, connect, timeout,
    /// malformed request body).
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The upstream answered with a non-success status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// The transform task panicked or was cancelled.
    #[error("Internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Runs query definitions against their upstream APIs.
pub struct Executor {
    client: reqwest::Client,
    limits: TransformLimits,
}

impl Executor {
    /// Create an executor whose requests time out after `timeout`.
    pub fn new(timeout: Duration, limits: TransformLimits) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, limits })
    }

    /// Execute `target` and return its (optionally transformed) response.
    pub async fn execute(&self, target: ExecuteTarget) -> Result<Value, ExecuteError> {
        let url = target.url.trim();
        if url.is_empty() {
            return Err(ExecuteError::MissingUrl);
        }
        let method = target.method.unwrap_or_default();

        let mut request = self.client.request(reqwest_method(method), url);
        for (name, value) in target.headers.unwrap_or_default() {
            request = request.header(name, value);
        }
        if let Some(body) = target.body.as_deref().filter(|b| !b.trim().is_empty()) {
            let payload: Value = serde_json::from_str(body)
                .map_err(|e| ExecuteError::RequestFailed(format!("invalid JSON body: {e}")))?;
            request = request.json(&payload);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(url, method = %method, error = %e, "Outbound request failed");
            ExecuteError::RequestFailed(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::info!(url, method = %method, status = status.as_u16(), "Upstream returned error status");
            let reason = status.canonical_reason().unwrap_or_default();
            return Err(ExecuteError::Upstream {
                status: status.as_u16(),
                message: format!("{method} {url}: {} {reason}", status.as_u16())
                    .trim_end()
                    .to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ExecuteError::RequestFailed(e.to_string()))?;
        let data = decode_body(&bytes);
        tracing::debug!(url, method = %method, status = status.as_u16(), bytes = bytes.len(), "Upstream responded");

        match target.transform.filter(|expr| !expr.trim().is_empty()) {
            Some(expr) => run_transform(expr, data, self.limits).await,
            None => Ok(data),
        }
    }
}

/// Evaluate a transform on the blocking pool; evaluation is CPU-bound and
/// may run up to the step limit.
async fn run_transform(
    expr: String,
    data: Value,
    limits: TransformLimits,
) -> Result<Value, ExecuteError> {
    let result =
        tokio::task::spawn_blocking(move || transform::evaluate(expr.trim(), data, &limits))
            .await
            .map_err(|e| ExecuteError::Internal(format!("Transform task failed: {e}")))?;
    Ok(result?)
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// JSON if it parses, a string if it does not, `null` if empty.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
