//! Identity extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use fetchboard_core::error::CoreError;
use fetchboard_core::identity::Identity;

use crate::auth::session::{validate_session_token, SESSION_COOKIE};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::state::AppState;

/// The caller on whose behalf a request runs.
///
/// In placeholder mode every request resolves to the configured fixed user.
/// In session mode the identity is read from a session token in the
/// `fetchboard_session` cookie or an `Authorization: Bearer` header.
///
/// ```ignore
/// async fn my_handler(AuthUser(identity): AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %identity.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = match &state.config.auth {
            AuthConfig::Placeholder { user_id } => {
                return Ok(AuthUser(Identity::placeholder(user_id.clone())))
            }
            AuthConfig::Session(session) => session,
        };

        let token = bearer_token(parts)
            .or_else(|| {
                CookieJar::from_headers(&parts.headers)
                    .get(SESSION_COOKIE)
                    .map(|c| c.value().to_string())
            })
            .ok_or_else(not_authenticated)?;

        let identity = validate_session_token(&token, session).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            not_authenticated()
        })?;

        Ok(AuthUser(identity))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn not_authenticated() -> AppError {
    AppError::Core(CoreError::Unauthorized("Not authenticated".into()))
}
