//! Storage layer for fetch board.
//!
//! Records live in a key-value store behind the [`KvStore`] trait, one JSON
//! document per key, namespaced per user (see [`keys`]). The repositories in
//! [`repositories`] are the only code that knows the key layout.

use std::sync::Arc;

pub mod keys;
pub mod repositories;
pub mod store;

pub use store::memory::MemoryStore;
pub use store::{KvStore, StoreError};

/// Shared handle to the configured store.
pub type SharedStore = Arc<dyn KvStore>;

/// Build the default in-process store.
pub fn memory_store() -> SharedStore {
    Arc::new(MemoryStore::default())
}
