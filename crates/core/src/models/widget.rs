//! Dashboard widgets and the reorder request/outcome.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{new_record_id, touch, RecordId, Timestamp};

/// Grid width of a widget: half (6 columns) or full (12 columns).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WidgetSize {
    #[default]
    Half,
    Full,
}

impl TryFrom<u8> for WidgetSize {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            6 => Ok(Self::Half),
            12 => Ok(Self::Full),
            other => Err(format!("widget size must be 6 or 12, got {other}")),
        }
    }
}

impl From<WidgetSize> for u8 {
    fn from(size: WidgetSize) -> Self {
        match size {
            WidgetSize::Half => 6,
            WidgetSize::Full => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlType {
    Text,
    Image,
}

/// A labelled value rendered inside a widget card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetControl {
    pub control_type: ControlType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_text: Option<String>,
    /// Path into the query result, e.g. `data.total`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_value: Option<String>,
}

/// A stored dashboard widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardWidget {
    pub id: RecordId,
    pub query_id: RecordId,
    pub size: WidgetSize,
    #[serde(default)]
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub controls: Vec<WidgetControl>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `POST /api/dashboard/widgets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWidget {
    #[serde(default)]
    pub query_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<WidgetSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<WidgetControl>>,
}

/// Body of `PUT /api/dashboard/widgets/{id}`. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWidget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<WidgetSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<WidgetControl>>,
}

/// Body of `PUT /api/dashboard/widgets/positions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorderWidgets {
    #[serde(default)]
    pub ids: Option<Vec<RecordId>>,
}

/// Result of a best-effort reorder.
///
/// Unknown ids land in `missing`; ids whose write failed land in `failed`.
/// `success` is true when nothing failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderOutcome {
    pub success: bool,
    pub updated: Vec<RecordId>,
    pub missing: Vec<RecordId>,
    pub failed: Vec<RecordId>,
}

const QUERY_ID_REQUIRED: &str = "queryId is required";

impl DashboardWidget {
    /// Build a new widget. `next_position` is used when the request omits one.
    pub fn create(input: CreateWidget, next_position: i64) -> Result<Self, CoreError> {
        if input.query_id.trim().is_empty() {
            return Err(CoreError::Validation(QUERY_ID_REQUIRED.into()));
        }

        let now = chrono::Utc::now();
        Ok(Self {
            id: new_record_id(),
            query_id: input.query_id,
            size: input.size.unwrap_or_default(),
            position: input.position.unwrap_or(next_position),
            title: input.title,
            controls: input.controls.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge an update over this widget. `id` and `created_at` never change.
    pub fn apply(&mut self, update: UpdateWidget) -> Result<(), CoreError> {
        if update
            .query_id
            .as_deref()
            .is_some_and(|q| q.trim().is_empty())
        {
            return Err(CoreError::Validation(QUERY_ID_REQUIRED.into()));
        }

        if let Some(query_id) = update.query_id {
            self.query_id = query_id;
        }
        if let Some(size) = update.size {
            self.size = size;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(title) = update.title {
            self.title = Some(title);
        }
        if let Some(controls) = update.controls {
            self.controls = controls;
        }
        self.updated_at = touch(self.updated_at);
        Ok(())
    }

    /// Move the widget to `position`, refreshing `updated_at`.
    pub fn reposition(&mut self, position: i64) {
        self.position = position;
        self.updated_at = touch(self.updated_at);
    }
}
