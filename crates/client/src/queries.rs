//! Client-side cache of the caller's saved queries.

use fetchboard_core::models::query::{CreateQuery, Query, UpdateQuery};
use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::state::{Collection, LoadState};

/// Mirrors the server's query list.
///
/// The lock is never held across a request, so readers observe
/// [`LoadState::Loading`] while a fetch is in flight.
pub struct QueriesStore {
    api: ApiClient,
    queries: RwLock<Collection<Query>>,
}

impl QueriesStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            queries: RwLock::new(Collection::default()),
        }
    }

    pub async fn state(&self) -> LoadState {
        self.queries.read().await.state().clone()
    }

    /// Snapshot of the cached queries.
    pub async fn queries(&self) -> Vec<Query> {
        self.queries.read().await.items().to_vec()
    }

    /// Reload the full list from the server.
    pub async fn fetch(&self) -> Result<(), ClientError> {
        self.queries.write().await.begin_load();

        match self.api.list_queries().await {
            Ok(list) => {
                tracing::debug!(count = list.len(), "Queries loaded");
                self.queries.write().await.loaded(list);
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to load queries").await),
        }
    }

    /// The cached query, or a server fetch that is then cached.
    pub async fn get_by_id(&self, id: &str) -> Result<Query, ClientError> {
        if let Some(query) = self.queries.read().await.get(id) {
            return Ok(query.clone());
        }

        match self.api.get_query(id).await {
            Ok(query) => {
                let mut queries = self.queries.write().await;
                queries.upsert(query.clone());
                queries.acknowledged();
                Ok(query)
            }
            Err(e) => Err(self.fail(e, "Failed to load query").await),
        }
    }

    pub async fn create(&self, input: &CreateQuery) -> Result<Query, ClientError> {
        match self.api.create_query(input).await {
            Ok(query) => {
                let mut queries = self.queries.write().await;
                queries.upsert(query.clone());
                queries.acknowledged();
                Ok(query)
            }
            Err(e) => Err(self.fail(e, "Failed to create query").await),
        }
    }

    /// Update on the server; the cached copy, if any, takes the server's
    /// answer.
    pub async fn update(&self, id: &str, input: &UpdateQuery) -> Result<Query, ClientError> {
        match self.api.update_query(id, input).await {
            Ok(query) => {
                let mut queries = self.queries.write().await;
                queries.replace(query.clone());
                queries.acknowledged();
                Ok(query)
            }
            Err(e) => Err(self.fail(e, "Failed to update query").await),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        match self.api.delete_query(id).await {
            Ok(()) => {
                let mut queries = self.queries.write().await;
                queries.remove(id);
                queries.acknowledged();
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to delete query").await),
        }
    }

    /// Run a saved query. Does not touch the cache.
    pub async fn execute(&self, id: &str) -> Result<serde_json::Value, ClientError> {
        self.api.execute_query(id).await
    }

    async fn fail(&self, err: ClientError, context: &str) -> ClientError {
        tracing::warn!(error = %err, "{context}");
        self.queries.write().await.failed(err.to_string());
        err
    }
}
