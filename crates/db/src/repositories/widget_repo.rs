//! Repository for dashboard widgets, stored under
//! `user:{userId}:dashboard:widgets:{id}`.

use fetchboard_core::identity::Identity;
use fetchboard_core::models::widget::{CreateWidget, DashboardWidget, ReorderOutcome, UpdateWidget};
use fetchboard_core::types::RecordId;
use futures::future::join_all;

use super::{load, load_all, save, RepoError};
use crate::keys;
use crate::store::{KvStore, StoreError};

/// Per-id result of a reorder write.
enum Placement {
    Updated,
    Missing,
    Failed,
}

/// Provides data access for a user's dashboard widgets.
pub struct WidgetRepo;

impl WidgetRepo {
    /// All of the user's widgets in display order.
    pub async fn list(
        store: &dyn KvStore,
        identity: &Identity,
    ) -> Result<Vec<DashboardWidget>, StoreError> {
        let mut widgets: Vec<DashboardWidget> =
            load_all(store, &keys::widgets_prefix(identity)).await?;
        widgets.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
        Ok(widgets)
    }

    pub async fn get(
        store: &dyn KvStore,
        identity: &Identity,
        id: &str,
    ) -> Result<Option<DashboardWidget>, StoreError> {
        load(store, &keys::widget_key(identity, id)).await
    }

    /// Validate and persist a new widget. Without an explicit position it is
    /// placed after the current last widget.
    pub async fn create(
        store: &dyn KvStore,
        identity: &Identity,
        input: CreateWidget,
    ) -> Result<DashboardWidget, RepoError> {
        let next_position = if input.position.is_some() {
            0
        } else {
            Self::list(store, identity)
                .await?
                .iter()
                .map(|w| w.position + 1)
                .max()
                .unwrap_or(0)
        };

        let widget = DashboardWidget::create(input, next_position)?;
        save(store, &keys::widget_key(identity, &widget.id), &widget).await?;
        Ok(widget)
    }

    /// Merge `input` over the stored widget. Returns `None` if it does not exist.
    pub async fn update(
        store: &dyn KvStore,
        identity: &Identity,
        id: &str,
        input: UpdateWidget,
    ) -> Result<Option<DashboardWidget>, RepoError> {
        let key = keys::widget_key(identity, id);
        let Some(mut widget) = load::<DashboardWidget>(store, &key).await? else {
            return Ok(None);
        };
        widget.apply(input)?;
        save(store, &key, &widget).await?;
        Ok(Some(widget))
    }

    /// Delete a widget. Returns whether it existed.
    pub async fn delete(store: &dyn KvStore, identity: &Identity, id: &str) -> Result<bool, StoreError> {
        store.remove(&keys::widget_key(identity, id)).await
    }

    /// Give each listed widget its index as position.
    ///
    /// Best effort: ids with no stored widget are reported as missing, and a
    /// failed write leaves the other widgets updated. Writes run concurrently.
    pub async fn reorder(store: &dyn KvStore, identity: &Identity, ids: &[RecordId]) -> ReorderOutcome {
        let writes = ids.iter().enumerate().map(|(index, id)| async move {
            let key = keys::widget_key(identity, id);
            let placement = match load::<DashboardWidget>(store, &key).await {
                Ok(Some(mut widget)) => {
                    widget.reposition(index as i64);
                    match save(store, &key, &widget).await {
                        Ok(()) => Placement::Updated,
                        Err(e) => {
                            tracing::warn!(widget_id = %id, error = %e, "Failed to write widget position");
                            Placement::Failed
                        }
                    }
                }
                Ok(None) => Placement::Missing,
                Err(e) => {
                    tracing::warn!(widget_id = %id, error = %e, "Failed to read widget for reorder");
                    Placement::Failed
                }
            };
            (id.clone(), placement)
        });

        let mut outcome = ReorderOutcome::default();
        for (id, placement) in join_all(writes).await {
            match placement {
                Placement::Updated => outcome.updated.push(id),
                Placement::Missing => outcome.missing.push(id),
                Placement::Failed => outcome.failed.push(id),
            }
        }
        outcome.success = outcome.failed.is_empty();
        outcome
    }
}
