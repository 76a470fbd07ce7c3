//! Client-side cache of the caller's dashboard widgets.

use std::collections::BTreeMap;

use fetchboard_core::models::widget::{
    CreateWidget, DashboardWidget, ReorderOutcome, UpdateWidget,
};
use fetchboard_core::types::RecordId;
use tokio::sync::RwLock;

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::state::{Collection, LoadState};

#[derive(Default)]
struct Dashboard {
    widgets: Collection<DashboardWidget>,
    /// Edits whose save failed, keyed by widget id.
    pending: BTreeMap<RecordId, DashboardWidget>,
}

/// Mirrors the server's widget list in position order.
pub struct DashboardStore {
    api: ApiClient,
    inner: RwLock<Dashboard>,
}

impl DashboardStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            inner: RwLock::new(Dashboard::default()),
        }
    }

    pub async fn state(&self) -> LoadState {
        self.inner.read().await.widgets.state().clone()
    }

    /// Snapshot of the cached widgets.
    pub async fn widgets(&self) -> Vec<DashboardWidget> {
        self.inner.read().await.widgets.items().to_vec()
    }

    /// The attempted edit for `id` if its last save failed.
    pub async fn pending(&self, id: &str) -> Option<DashboardWidget> {
        self.inner.read().await.pending.get(id).cloned()
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        self.inner.write().await.widgets.begin_load();

        match self.api.list_widgets().await {
            Ok(list) => {
                tracing::debug!(count = list.len(), "Widgets loaded");
                self.inner.write().await.widgets.loaded(list);
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to load widgets").await),
        }
    }

    /// Push the full state of `widget` to the server.
    ///
    /// On failure the edit is kept in [`pending`](Self::pending) until a
    /// later save of the same widget succeeds.
    pub async fn save(&self, widget: &DashboardWidget) -> Result<DashboardWidget, ClientError> {
        let update = UpdateWidget {
            query_id: Some(widget.query_id.clone()),
            size: Some(widget.size),
            position: Some(widget.position),
            title: widget.title.clone(),
            controls: Some(widget.controls.clone()),
        };

        match self.api.update_widget(&widget.id, &update).await {
            Ok(saved) => {
                let mut inner = self.inner.write().await;
                inner.pending.remove(&saved.id);
                inner.widgets.upsert(saved.clone());
                inner.widgets.sort_by_key(|w| w.position);
                inner.widgets.acknowledged();
                Ok(saved)
            }
            Err(e) => {
                self.inner
                    .write()
                    .await
                    .pending
                    .insert(widget.id.clone(), widget.clone());
                Err(self.fail(e, "Failed to save widget").await)
            }
        }
    }

    pub async fn create(&self, input: &CreateWidget) -> Result<DashboardWidget, ClientError> {
        match self.api.create_widget(input).await {
            Ok(widget) => {
                let mut inner = self.inner.write().await;
                inner.widgets.upsert(widget.clone());
                inner.widgets.sort_by_key(|w| w.position);
                inner.widgets.acknowledged();
                Ok(widget)
            }
            Err(e) => Err(self.fail(e, "Failed to create widget").await),
        }
    }

    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        match self.api.delete_widget(id).await {
            Ok(()) => {
                let mut inner = self.inner.write().await;
                inner.widgets.remove(id);
                inner.pending.remove(id);
                inner.widgets.acknowledged();
                Ok(())
            }
            Err(e) => Err(self.fail(e, "Failed to delete widget").await),
        }
    }

    /// Persist a new order. Cached widgets the server updated take their
    /// index as position.
    pub async fn update_positions(
        &self,
        ordered_ids: &[RecordId],
    ) -> Result<ReorderOutcome, ClientError> {
        match self.api.reorder_widgets(ordered_ids).await {
            Ok(outcome) => {
                let mut inner = self.inner.write().await;
                for (index, id) in ordered_ids.iter().enumerate() {
                    if !outcome.updated.contains(id) {
                        continue;
                    }
                    if let Some(widget) = inner.widgets.get_mut(id) {
                        widget.position = index as i64;
                    }
                }
                inner.widgets.sort_by_key(|w| w.position);
                inner.widgets.acknowledged();
                if !outcome.missing.is_empty() {
                    tracing::info!(missing = ?outcome.missing, "Reorder skipped unknown widgets");
                }
                Ok(outcome)
            }
            Err(e) => Err(self.fail(e, "Failed to update widget positions").await),
        }
    }

    async fn fail(&self, err: ClientError, context: &str) -> ClientError {
        tracing::warn!(error = %err, "{context}");
        self.inner.write().await.widgets.failed(err.to_string());
        err
    }
}
