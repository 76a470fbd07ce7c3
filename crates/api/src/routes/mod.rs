pub mod auth;
pub mod execute;
pub mod health;
pub mod queries;
pub mod widgets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /queries                                         list, create
/// /queries/{id}                                    get, update, delete
/// /queries/{id}/execute                            run a saved query (POST)
///
/// /execute                                         run an ad-hoc request (POST)
///
/// /dashboard/widgets                               list, create
/// /dashboard/widgets/positions                     reorder (PUT)
/// /dashboard/widgets/{id}                          get, update, delete
///
/// /auth/github                                     login redirect
/// /auth/session                                    current identity, logout
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/queries", queries::router())
        .merge(execute::router())
        .nest("/dashboard/widgets", widgets::router())
        .nest("/auth", auth::router())
}
