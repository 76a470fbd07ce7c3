use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use fetchboard_db::{KvStore, MemoryStore, StoreError};
use serde_json::Value;

/// A [`MemoryStore`] whose writes fail for selected keys.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing: Mutex<HashSet<String>>,
}

impl FlakyStore {
    pub fn fail_writes_to(&self, key: impl Into<String>) {
        self.failing.lock().unwrap().insert(key.into());
    }
}

#[async_trait]
impl KvStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(key) {
            return Err(StoreError::Backend(format!("write to {key} refused")));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.remove(key).await
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.inner.keys(prefix).await
    }
}
