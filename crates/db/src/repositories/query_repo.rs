//! Repository for saved queries, stored under `user:{userId}:queries:{id}`.

use fetchboard_core::identity::Identity;
use fetchboard_core::models::query::{CreateQuery, Query, UpdateQuery};

use super::{load, load_all, save, RepoError};
use crate::keys;
use crate::store::{KvStore, StoreError};

/// Provides data access for a user's saved queries.
pub struct QueryRepo;

impl QueryRepo {
    /// All of the user's queries, most recently updated first.
    pub async fn list(store: &dyn KvStore, identity: &Identity) -> Result<Vec<Query>, StoreError> {
        let mut queries: Vec<Query> = load_all(store, &keys::queries_prefix(identity)).await?;
        queries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(queries)
    }

    pub async fn get(
        store: &dyn KvStore,
        identity: &Identity,
        id: &str,
    ) -> Result<Option<Query>, StoreError> {
        load(store, &keys::query_key(identity, id)).await
    }

    /// Validate and persist a new query.
    pub async fn create(
        store: &dyn KvStore,
        identity: &Identity,
        input: CreateQuery,
    ) -> Result<Query, RepoError> {
        let query = Query::create(input)?;
        save(store, &keys::query_key(identity, &query.id), &query).await?;
        Ok(query)
    }

    /// Merge `input` over the stored query. Returns `None` if it does not exist.
    pub async fn update(
        store: &dyn KvStore,
        identity: &Identity,
        id: &str,
        input: UpdateQuery,
    ) -> Result<Option<Query>, RepoError> {
        let key = keys::query_key(identity, id);
        let Some(mut query) = load::<Query>(store, &key).await? else {
            return Ok(None);
        };
        query.apply(input)?;
        save(store, &key, &query).await?;
        Ok(Some(query))
    }

    /// Delete a query. Returns whether it existed.
    pub async fn delete(store: &dyn KvStore, identity: &Identity, id: &str) -> Result<bool, StoreError> {
        store.remove(&keys::query_key(identity, id)).await
    }
}
