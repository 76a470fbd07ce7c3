//! Handlers for saved queries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fetchboard_core::error::CoreError;
use fetchboard_core::models::query::{CreateQuery, UpdateQuery};
use fetchboard_db::repositories::QueryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::SuccessResponse;
use crate::state::AppState;

/// Entity name used in not-found errors.
pub(crate) const QUERY: &str = "Query";

/// GET /api/queries
///
/// List the caller's queries, most recently updated first.
pub async fn list_queries(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let queries = QueryRepo::list(state.store.as_ref(), &identity).await?;
    Ok(Json(queries))
}

/// GET /api/queries/{id}
pub async fn get_query(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let query = QueryRepo::get(state.store.as_ref(), &identity, &id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found(QUERY, &id)))?;
    Ok(Json(query))
}

/// POST /api/queries
///
/// Create a query. `name` and `url` are required.
pub async fn create_query(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateQuery>,
) -> AppResult<impl IntoResponse> {
    let query = QueryRepo::create(state.store.as_ref(), &identity, input).await?;

    tracing::info!(user_id = %identity.user_id, query_id = %query.id, "Query created");

    Ok((StatusCode::CREATED, Json(query)))
}

/// PUT /api/queries/{id}
///
/// Merge the supplied fields over the stored query.
pub async fn update_query(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateQuery>,
) -> AppResult<impl IntoResponse> {
    let query = QueryRepo::update(state.store.as_ref(), &identity, &id, input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found(QUERY, &id)))?;

    tracing::info!(user_id = %identity.user_id, query_id = %id, "Query updated");

    Ok(Json(query))
}

/// DELETE /api/queries/{id}
pub async fn delete_query(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !QueryRepo::delete(state.store.as_ref(), &identity, &id).await? {
        return Err(AppError::Core(CoreError::not_found(QUERY, &id)));
    }

    tracing::info!(user_id = %identity.user_id, query_id = %id, "Query deleted");

    Ok(Json(SuccessResponse::ok()))
}
