//! Declarative rendering hints attached to a saved query.

use serde::{Deserialize, Serialize};

/// How the UI renders a query result. Opaque to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum DisplayConfig {
    /// A single headline value.
    Card {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },
    Table {
        #[serde(default)]
        columns: Vec<TableColumn>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data_path: Option<String>,
    },
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_template: Option<String>,
    },
    #[default]
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    pub key: String,
    pub label: String,
}
