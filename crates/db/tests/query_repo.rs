//! Integration tests for `QueryRepo` against the in-memory store.

use assert_matches::assert_matches;
use fetchboard_core::error::CoreError;
use fetchboard_core::identity::Identity;
use fetchboard_core::models::display::DisplayConfig;
use fetchboard_core::models::query::{CreateQuery, HttpMethod, UpdateQuery};
use fetchboard_db::repositories::{QueryRepo, RepoError};
use fetchboard_db::{KvStore, MemoryStore};

fn new_query(name: &str) -> CreateQuery {
    CreateQuery {
        name: name.to_string(),
        url: "https://example.com/api".to_string(),
        ..CreateQuery::default()
    }
}

// ---------------------------------------------------------------------------
// Create / get
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_applies_defaults_and_persists() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");

    let query = QueryRepo::create(&store, &me, new_query("Users")).await.unwrap();

    assert_eq!(query.method, HttpMethod::Get);
    assert!(query.headers.is_empty());
    assert_eq!(query.display, DisplayConfig::Raw);
    assert_eq!(query.created_at, query.updated_at);

    let stored = QueryRepo::get(&store, &me, &query.id).await.unwrap();
    assert_eq!(stored, Some(query.clone()));
    assert!(store
        .get(&format!("user:u1:queries:{}", query.id))
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn create_requires_name_and_url() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");

    let err = QueryRepo::create(&store, &me, new_query("   ")).await.unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Validation(ref m)) if m == "Name and URL are required");
    assert!(store.is_empty().await);
}

// ---------------------------------------------------------------------------
// List ordering and isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_is_newest_updated_first() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");

    let first = QueryRepo::create(&store, &me, new_query("first")).await.unwrap();
    let second = QueryRepo::create(&store, &me, new_query("second")).await.unwrap();
    QueryRepo::update(
        &store,
        &me,
        &first.id,
        UpdateQuery {
            name: Some("first, renamed".into()),
            ..UpdateQuery::default()
        },
    )
    .await
    .unwrap();

    let names: Vec<_> = QueryRepo::list(&store, &me)
        .await
        .unwrap()
        .into_iter()
        .map(|q| q.name)
        .collect();
    assert_eq!(names, vec!["first, renamed".to_string(), second.name]);
}

#[tokio::test]
async fn users_do_not_see_each_others_queries() {
    let store = MemoryStore::new();
    let alice = Identity::new("alice");
    let bob = Identity::new("bob");

    let query = QueryRepo::create(&store, &alice, new_query("mine")).await.unwrap();

    assert!(QueryRepo::list(&store, &bob).await.unwrap().is_empty());
    assert_eq!(QueryRepo::get(&store, &bob, &query.id).await.unwrap(), None);
    assert!(!QueryRepo::delete(&store, &bob, &query.id).await.unwrap());
    assert_eq!(QueryRepo::list(&store, &alice).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_merges_and_keeps_identity_fields() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    let query = QueryRepo::create(&store, &me, new_query("q")).await.unwrap();

    let updated = QueryRepo::update(
        &store,
        &me,
        &query.id,
        UpdateQuery {
            method: Some(HttpMethod::Post),
            transform: Some("response.items".into()),
            ..UpdateQuery::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.id, query.id);
    assert_eq!(updated.created_at, query.created_at);
    assert!(updated.updated_at > query.updated_at);
    assert_eq!(updated.name, "q");
    assert_eq!(updated.method, HttpMethod::Post);
    assert_eq!(updated.transform, "response.items");
}

#[tokio::test]
async fn update_of_unknown_id_is_none() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    let result = QueryRepo::update(&store, &me, "missing", UpdateQuery::default())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn update_rejects_blank_url() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    let query = QueryRepo::create(&store, &me, new_query("q")).await.unwrap();

    let err = QueryRepo::update(
        &store,
        &me,
        &query.id,
        UpdateQuery {
            url: Some(String::new()),
            ..UpdateQuery::default()
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Validation(_)));

    let stored = QueryRepo::get(&store, &me, &query.id).await.unwrap().unwrap();
    assert_eq!(stored.url, query.url);
}

#[tokio::test]
async fn delete_reports_existence() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    let query = QueryRepo::create(&store, &me, new_query("q")).await.unwrap();

    assert!(QueryRepo::delete(&store, &me, &query.id).await.unwrap());
    assert!(!QueryRepo::delete(&store, &me, &query.id).await.unwrap());
}

#[tokio::test]
async fn undecodable_records_are_skipped_in_lists() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    QueryRepo::create(&store, &me, new_query("good")).await.unwrap();
    store
        .set("user:u1:queries:broken", serde_json::json!({"name": 5}))
        .await
        .unwrap();

    let queries = QueryRepo::list(&store, &me).await.unwrap();
    assert_eq!(queries.len(), 1);
    assert!(QueryRepo::get(&store, &me, "broken").await.is_err());
}
