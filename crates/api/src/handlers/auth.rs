//! Session endpoints. Login itself is delegated to an external service.

use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;

use crate::auth::session::SESSION_COOKIE;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::SuccessResponse;
use crate::state::AppState;

/// GET /api/auth/github
///
/// Redirect to the configured external login service.
pub async fn login(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let url = state
        .config
        .auth_login_url
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Login is not configured".into()))?;
    Ok(Redirect::to(url))
}

/// GET /api/auth/session
///
/// The identity the current request runs as.
pub async fn current_session(AuthUser(identity): AuthUser) -> AppResult<impl IntoResponse> {
    Ok(Json(identity))
}

/// DELETE /api/auth/session
///
/// Clear the session cookie.
pub async fn logout(jar: CookieJar) -> AppResult<impl IntoResponse> {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    tracing::info!("Session cookie cleared");
    Ok((jar, Json(SuccessResponse::ok())))
}
