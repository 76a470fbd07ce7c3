//! Saved HTTP query definitions and the ad-hoc execution target.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::display::DisplayConfig;
use crate::types::{new_record_id, touch, RecordId, Timestamp};

/// HTTP methods a query may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored query record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub id: RecordId,
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub transform: String,
    #[serde(default)]
    pub display: DisplayConfig,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `POST /api/queries`.
///
/// `name` and `url` default to empty so that missing fields produce the same
/// validation error as blank ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayConfig>,
}

/// Body of `PUT /api/queries/{id}`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayConfig>,
}

const NAME_AND_URL_REQUIRED: &str = "Name and URL are required";

impl Query {
    /// Build a new record from a create request, assigning id and timestamps.
    pub fn create(input: CreateQuery) -> Result<Self, CoreError> {
        if input.name.trim().is_empty() || input.url.trim().is_empty() {
            return Err(CoreError::Validation(NAME_AND_URL_REQUIRED.into()));
        }

        let now = chrono::Utc::now();
        Ok(Self {
            id: new_record_id(),
            name: input.name,
            url: input.url,
            method: input.method.unwrap_or_default(),
            headers: input.headers.unwrap_or_default(),
            body: input.body.unwrap_or_default(),
            transform: input.transform.unwrap_or_default(),
            display: input.display.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Merge an update over this record. `id` and `created_at` never change.
    pub fn apply(&mut self, update: UpdateQuery) -> Result<(), CoreError> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&update.name) || blank(&update.url) {
            return Err(CoreError::Validation(NAME_AND_URL_REQUIRED.into()));
        }

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(url) = update.url {
            self.url = url;
        }
        if let Some(method) = update.method {
            self.method = method;
        }
        if let Some(headers) = update.headers {
            self.headers = headers;
        }
        if let Some(body) = update.body {
            self.body = body;
        }
        if let Some(transform) = update.transform {
            self.transform = transform;
        }
        if let Some(display) = update.display {
            self.display = display;
        }
        self.updated_at = touch(self.updated_at);
        Ok(())
    }
}

/// Body of `POST /api/execute`: everything needed to run a request once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteTarget {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
}

impl From<&Query> for ExecuteTarget {
    fn from(query: &Query) -> Self {
        Self {
            url: query.url.clone(),
            method: Some(query.method),
            headers: Some(query.headers.clone()),
            body: Some(query.body.clone()),
            transform: Some(query.transform.clone()),
        }
    }
}
