//! `DashboardStore` against a live in-process server.

mod common;

use assert_matches::assert_matches;
use fetchboard_client::{ApiClient, ClientError, DashboardStore, LoadState};
use fetchboard_core::models::widget::{CreateWidget, WidgetSize};

fn new_widget(query_id: &str) -> CreateWidget {
    CreateWidget {
        query_id: query_id.into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn load_returns_widgets_in_position_order() {
    let api = common::spawn_server().await;
    let a = api.create_widget(&new_widget("q1")).await.unwrap();
    let b = api.create_widget(&new_widget("q2")).await.unwrap();
    api.reorder_widgets(&[b.id.clone(), a.id.clone()]).await.unwrap();
    let store = DashboardStore::new(api);

    store.load().await.unwrap();

    assert_eq!(store.state().await, LoadState::Ready);
    let ids: Vec<_> = store.widgets().await.into_iter().map(|w| w.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn create_save_and_remove() {
    let api = common::spawn_server().await;
    let store = DashboardStore::new(api);
    store.load().await.unwrap();

    let mut widget = store.create(&new_widget("q1")).await.unwrap();
    assert_eq!(widget.position, 0);

    widget.size = WidgetSize::Full;
    widget.title = Some("Totals".into());
    let saved = store.save(&widget).await.unwrap();
    assert_eq!(saved.size, WidgetSize::Full);
    assert_eq!(store.widgets().await, vec![saved]);

    store.remove(&widget.id).await.unwrap();
    assert!(store.widgets().await.is_empty());
}

#[tokio::test]
async fn failed_save_keeps_edit_pending() {
    let api = common::spawn_server().await;
    let store = DashboardStore::new(api.clone());
    let mut widget = store.create(&new_widget("q1")).await.unwrap();
    store.load().await.unwrap();

    // Deleted behind the store's back, so the save 404s.
    api.delete_widget(&widget.id).await.unwrap();
    widget.title = Some("Edited".into());

    let err = store.save(&widget).await.unwrap_err();

    assert_matches!(err, ClientError::Api { status: 404, .. });
    assert_eq!(store.pending(&widget.id).await, Some(widget.clone()));
    assert_eq!(store.state().await.error(), Some("Widget not found"));
    // The cached copy is the last acknowledged one.
    assert_eq!(store.widgets().await[0].title, None);
}

#[tokio::test]
async fn update_positions_reorders_cache() {
    let api = common::spawn_server().await;
    let store = DashboardStore::new(api);
    let a = store.create(&new_widget("q")).await.unwrap();
    let b = store.create(&new_widget("q")).await.unwrap();
    let c = store.create(&new_widget("q")).await.unwrap();

    let outcome = store
        .update_positions(&[c.id.clone(), a.id.clone(), "ghost".into(), b.id.clone()])
        .await
        .unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.missing, vec!["ghost".to_string()]);
    let cached: Vec<_> = store
        .widgets()
        .await
        .into_iter()
        .map(|w| (w.id, w.position))
        .collect();
    assert_eq!(cached, vec![(c.id, 0), (a.id, 1), (b.id, 3)]);
}

#[tokio::test]
async fn session_server_requires_a_token() {
    let (base, mint) = common::spawn_session_server().await;

    let anonymous = DashboardStore::new(ApiClient::new(base.clone()));
    let err = anonymous.load().await.unwrap_err();
    assert_matches!(err, ClientError::Api { status: 401, ref message } if message == "Not authenticated");

    let api = ApiClient::new(base).with_token(mint("7"));
    assert_eq!(api.session().await.unwrap().user_id, "7");
    let store = DashboardStore::new(api);
    store.load().await.unwrap();
    assert_eq!(store.state().await, LoadState::Ready);
}
