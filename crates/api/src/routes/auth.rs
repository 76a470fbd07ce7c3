use axum::routing::get;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Auth routes mounted at `/auth`.
///
/// ```text
/// GET    /github   -> login (redirect)
/// GET    /session  -> current_session
/// DELETE /session  -> logout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/github", get(auth::login))
        .route("/session", get(auth::current_session).delete(auth::logout))
}
