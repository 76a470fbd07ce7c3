//! Route definitions for dashboard widgets, mounted at `/dashboard/widgets`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::widgets;
use crate::state::AppState;

/// ```text
/// GET    /           -> list_widgets
/// POST   /           -> create_widget
/// PUT    /positions  -> reorder_widgets
/// GET    /{id}       -> get_widget
/// PUT    /{id}       -> update_widget
/// DELETE /{id}       -> delete_widget
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(widgets::list_widgets).post(widgets::create_widget))
        .route("/positions", put(widgets::reorder_widgets))
        .route(
            "/{id}",
            get(widgets::get_widget)
                .put(widgets::update_widget)
                .delete(widgets::delete_widget),
        )
}
