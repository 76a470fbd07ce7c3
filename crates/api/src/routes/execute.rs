use axum::routing::post;
use axum::Router;

use crate::handlers::execute;
use crate::state::AppState;

/// ```text
/// POST /execute -> execute
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/execute", post(execute::execute))
}
