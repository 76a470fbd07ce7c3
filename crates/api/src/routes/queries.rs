//! Route definitions for saved queries, mounted at `/queries`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{execute, queries};
use crate::state::AppState;

/// ```text
/// GET    /              -> list_queries
/// POST   /              -> create_query
/// GET    /{id}          -> get_query
/// PUT    /{id}          -> update_query
/// DELETE /{id}          -> delete_query
/// POST   /{id}/execute  -> execute_saved
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(queries::list_queries).post(queries::create_query))
        .route(
            "/{id}",
            get(queries::get_query)
                .put(queries::update_query)
                .delete(queries::delete_query),
        )
        .route("/{id}/execute", post(execute::execute_saved))
}
