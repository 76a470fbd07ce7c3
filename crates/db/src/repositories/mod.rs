//! Repository layer: one unit struct per record type, with associated async
//! functions taking the store and the caller's identity.

pub mod query_repo;
pub mod widget_repo;

pub use query_repo::QueryRepo;
pub use widget_repo::WidgetRepo;

use fetchboard_core::error::CoreError;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::{KvStore, StoreError};

/// Failure of a repository operation that also validates its input.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

async fn load<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

async fn save<T: Serialize>(store: &dyn KvStore, key: &str, record: &T) -> Result<(), StoreError> {
    let value = serde_json::to_value(record).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, value).await
}

/// Read every record under `prefix`, fetching keys concurrently.
///
/// Keys that disappear between listing and reading are skipped, as are
/// documents that no longer decode (logged).
async fn load_all<T: DeserializeOwned>(
    store: &dyn KvStore,
    prefix: &str,
) -> Result<Vec<T>, StoreError> {
    let keys = store.keys(prefix).await?;
    let reads = join_all(keys.iter().map(|key| load::<T>(store, key))).await;

    let mut records = Vec::with_capacity(reads.len());
    for read in reads {
        match read {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(StoreError::Corrupt { key, source }) => {
                tracing::warn!(key = %key, error = %source, "Skipping undecodable record");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}
