//! The authenticated caller on whose behalf a request runs.

use serde::{Deserialize, Serialize};

/// Who a request acts for.
///
/// Every repository and executor call takes an `&Identity` explicitly; the
/// storage namespace is derived from [`Identity::user_id`] alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Identity {
    /// A bare identity carrying only a user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            login: None,
            name: None,
            avatar: None,
        }
    }

    /// The fixed identity used when authentication is disabled.
    pub fn placeholder(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            login: Some(user_id.clone()),
            name: None,
            avatar: None,
            user_id,
        }
    }
}
