//! Integration tests for `WidgetRepo`, including best-effort reordering.

mod common;

use assert_matches::assert_matches;
use common::FlakyStore;
use fetchboard_core::error::CoreError;
use fetchboard_core::identity::Identity;
use fetchboard_core::models::widget::{CreateWidget, UpdateWidget, WidgetSize};
use fetchboard_db::repositories::{RepoError, WidgetRepo};
use fetchboard_db::MemoryStore;

fn new_widget(query_id: &str) -> CreateWidget {
    CreateWidget {
        query_id: query_id.to_string(),
        ..CreateWidget::default()
    }
}

#[tokio::test]
async fn positions_default_to_the_end() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");

    let a = WidgetRepo::create(&store, &me, new_widget("q1")).await.unwrap();
    let b = WidgetRepo::create(&store, &me, new_widget("q2")).await.unwrap();
    let c = WidgetRepo::create(
        &store,
        &me,
        CreateWidget {
            position: Some(10),
            ..new_widget("q3")
        },
    )
    .await
    .unwrap();
    let d = WidgetRepo::create(&store, &me, new_widget("q4")).await.unwrap();

    assert_eq!((a.position, b.position, c.position, d.position), (0, 1, 10, 11));
    assert_eq!(a.size, WidgetSize::Half);
}

#[tokio::test]
async fn create_requires_query_id() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    let err = WidgetRepo::create(&store, &me, new_widget(" ")).await.unwrap_err();
    assert_matches!(err, RepoError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn list_is_sorted_by_position() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    for (query, position) in [("late", 5), ("early", 1), ("middle", 3)] {
        WidgetRepo::create(
            &store,
            &me,
            CreateWidget {
                position: Some(position),
                ..new_widget(query)
            },
        )
        .await
        .unwrap();
    }

    let order: Vec<_> = WidgetRepo::list(&store, &me)
        .await
        .unwrap()
        .into_iter()
        .map(|w| w.query_id)
        .collect();
    assert_eq!(order, vec!["early", "middle", "late"]);
}

#[tokio::test]
async fn update_and_delete() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    let widget = WidgetRepo::create(&store, &me, new_widget("q1")).await.unwrap();

    let updated = WidgetRepo::update(
        &store,
        &me,
        &widget.id,
        UpdateWidget {
            size: Some(WidgetSize::Full),
            title: Some("Revenue".into()),
            ..UpdateWidget::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.size, WidgetSize::Full);
    assert_eq!(updated.title.as_deref(), Some("Revenue"));
    assert_eq!(updated.created_at, widget.created_at);

    assert!(WidgetRepo::delete(&store, &me, &widget.id).await.unwrap());
    assert!(!WidgetRepo::delete(&store, &me, &widget.id).await.unwrap());
    assert!(WidgetRepo::update(&store, &me, &widget.id, UpdateWidget::default())
        .await
        .unwrap()
        .is_none());
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reorder_rewrites_positions_and_reports_missing_ids() {
    let store = MemoryStore::new();
    let me = Identity::new("u1");
    let a = WidgetRepo::create(&store, &me, new_widget("a")).await.unwrap();
    let b = WidgetRepo::create(&store, &me, new_widget("b")).await.unwrap();
    let c = WidgetRepo::create(&store, &me, new_widget("c")).await.unwrap();

    let ids = vec![c.id.clone(), "ghost".to_string(), a.id.clone(), b.id.clone()];
    let outcome = WidgetRepo::reorder(&store, &me, &ids).await;

    assert!(outcome.success);
    assert_eq!(outcome.missing, vec!["ghost".to_string()]);
    assert_eq!(outcome.updated, vec![c.id.clone(), a.id.clone(), b.id.clone()]);
    assert!(outcome.failed.is_empty());

    let widgets = WidgetRepo::list(&store, &me).await.unwrap();
    let positions: Vec<_> = widgets.iter().map(|w| (w.query_id.as_str(), w.position)).collect();
    assert_eq!(positions, vec![("c", 0), ("a", 2), ("b", 3)]);
    assert!(widgets.iter().all(|w| w.updated_at > w.created_at));
}

#[tokio::test]
async fn reorder_keeps_successful_writes_when_one_fails() {
    let store = FlakyStore::default();
    let me = Identity::new("u1");
    let a = WidgetRepo::create(&store, &me, new_widget("a")).await.unwrap();
    let b = WidgetRepo::create(&store, &me, new_widget("b")).await.unwrap();
    store.fail_writes_to(format!("user:u1:dashboard:widgets:{}", a.id));

    let outcome = WidgetRepo::reorder(&store, &me, &[b.id.clone(), a.id.clone()]).await;

    assert!(!outcome.success);
    assert_eq!(outcome.failed, vec![a.id.clone()]);
    assert_eq!(outcome.updated, vec![b.id.clone()]);

    let b_stored = WidgetRepo::get(&store, &me, &b.id).await.unwrap().unwrap();
    let a_stored = WidgetRepo::get(&store, &me, &a.id).await.unwrap().unwrap();
    assert_eq!(b_stored.position, 0);
    assert_eq!(a_stored.position, 0);
}

#[tokio::test]
async fn reorder_with_empty_list_succeeds() {
    let store = MemoryStore::new();
    let outcome = WidgetRepo::reorder(&store, &Identity::new("u1"), &[]).await;
    assert!(outcome.success);
    assert!(outcome.updated.is_empty());
}
