//! REST API client for the fetch board server.

use fetchboard_core::identity::Identity;
use fetchboard_core::models::query::{CreateQuery, ExecuteTarget, Query, UpdateQuery};
use fetchboard_core::models::widget::{
    CreateWidget, DashboardWidget, ReorderOutcome, ReorderWidgets, UpdateWidget,
};
use fetchboard_core::types::RecordId;
use reqwest::{Method, RequestBuilder};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

use crate::error::ClientError;

/// HTTP client for one fetch board server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Error body shape shared by every failing endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiClient {
    /// Create a client for a server.
    ///
    /// * `base_url` - Server origin, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Send `token` as a bearer session token on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    // ---- queries ----

    pub async fn list_queries(&self) -> Result<Vec<Query>, ClientError> {
        self.send(self.request(Method::GET, "/api/queries")).await
    }

    pub async fn get_query(&self, id: &str) -> Result<Query, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/queries/{id}")))
            .await
    }

    pub async fn create_query(&self, input: &CreateQuery) -> Result<Query, ClientError> {
        self.send(self.request(Method::POST, "/api/queries").json(input))
            .await
    }

    pub async fn update_query(&self, id: &str, input: &UpdateQuery) -> Result<Query, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/api/queries/{id}"))
                .json(input),
        )
        .await
    }

    pub async fn delete_query(&self, id: &str) -> Result<(), ClientError> {
        self.send::<IgnoredAny>(self.request(Method::DELETE, &format!("/api/queries/{id}")))
            .await
            .map(|_| ())
    }

    // ---- execution ----

    /// Run an ad-hoc request through the server and return its result.
    pub async fn execute(&self, target: &ExecuteTarget) -> Result<serde_json::Value, ClientError> {
        self.send(self.request(Method::POST, "/api/execute").json(target))
            .await
    }

    /// Run a saved query through the server and return its result.
    pub async fn execute_query(&self, id: &str) -> Result<serde_json::Value, ClientError> {
        self.send(self.request(Method::POST, &format!("/api/queries/{id}/execute")))
            .await
    }

    // ---- widgets ----

    pub async fn list_widgets(&self) -> Result<Vec<DashboardWidget>, ClientError> {
        self.send(self.request(Method::GET, "/api/dashboard/widgets"))
            .await
    }

    pub async fn get_widget(&self, id: &str) -> Result<DashboardWidget, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/dashboard/widgets/{id}")))
            .await
    }

    pub async fn create_widget(&self, input: &CreateWidget) -> Result<DashboardWidget, ClientError> {
        self.send(
            self.request(Method::POST, "/api/dashboard/widgets")
                .json(input),
        )
        .await
    }

    pub async fn update_widget(
        &self,
        id: &str,
        input: &UpdateWidget,
    ) -> Result<DashboardWidget, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/api/dashboard/widgets/{id}"))
                .json(input),
        )
        .await
    }

    pub async fn delete_widget(&self, id: &str) -> Result<(), ClientError> {
        self.send::<IgnoredAny>(
            self.request(Method::DELETE, &format!("/api/dashboard/widgets/{id}")),
        )
        .await
        .map(|_| ())
    }

    /// Give each listed widget its index as position.
    pub async fn reorder_widgets(&self, ids: &[RecordId]) -> Result<ReorderOutcome, ClientError> {
        let body = ReorderWidgets {
            ids: Some(ids.to_vec()),
        };
        self.send(
            self.request(Method::PUT, "/api/dashboard/widgets/positions")
                .json(&body),
        )
        .await
    }

    // ---- session ----

    /// The identity the server resolves for this client.
    pub async fn session(&self) -> Result<Identity, ClientError> {
        self.send(self.request(Method::GET, "/api/auth/session"))
            .await
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.message)
                .unwrap_or_else(|_| {
                    if text.trim().is_empty() {
                        status.to_string()
                    } else {
                        text
                    }
                });
            tracing::debug!(status = status.as_u16(), %message, "API request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.json().await?)
    }
}
