//! Handlers that run queries against their upstream APIs.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use fetchboard_core::error::CoreError;
use fetchboard_core::models::query::ExecuteTarget;
use fetchboard_db::repositories::QueryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::queries::QUERY;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/execute
///
/// Run an ad-hoc request `{url, method, headers, body, transform}` and return
/// the (transformed) response.
pub async fn execute(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    AppJson(target): AppJson<ExecuteTarget>,
) -> AppResult<impl IntoResponse> {
    tracing::debug!(user_id = %identity.user_id, url = %target.url, "Executing ad-hoc request");

    let result = state.executor.execute(target).await?;
    Ok(Json(result))
}

/// POST /api/queries/{id}/execute
///
/// Run a saved query.
pub async fn execute_saved(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let query = QueryRepo::get(state.store.as_ref(), &identity, &id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found(QUERY, &id)))?;

    tracing::debug!(user_id = %identity.user_id, query_id = %id, url = %query.url, "Executing saved query");

    let result = state.executor.execute(ExecuteTarget::from(&query)).await?;
    Ok(Json(result))
}
