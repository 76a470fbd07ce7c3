//! Shared response payload types for API handlers.
//!
//! Records are returned as bare JSON objects. Deletions and logout answer
//! with [`SuccessResponse`].

use serde::Serialize;

/// `{ "success": true }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
