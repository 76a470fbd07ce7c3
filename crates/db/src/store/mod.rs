//! Key-value store abstraction.
//!
//! Values are JSON documents. Keys are `:`-separated strings; `keys(prefix)`
//! lists every key starting with `prefix` in lexicographic order.

pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not complete the operation.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// A stored document does not decode as the expected record type.
    #[error("Corrupt record at {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded for storage.
    #[error("Failed to encode record for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Shared, concurrent key-value store.
///
/// Implementations must be safe to call from many requests at once. There is
/// no transaction support: the last writer for a key wins.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove `key`. Returns whether it existed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
}
