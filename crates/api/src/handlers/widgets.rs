//! Handlers for dashboard widgets.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use fetchboard_core::error::CoreError;
use fetchboard_core::models::widget::{CreateWidget, ReorderWidgets, UpdateWidget};
use fetchboard_db::repositories::WidgetRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::SuccessResponse;
use crate::state::AppState;

const WIDGET: &str = "Widget";

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/dashboard/widgets
///
/// List the caller's widgets in position order.
pub async fn list_widgets(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let widgets = WidgetRepo::list(state.store.as_ref(), &identity).await?;
    Ok(Json(widgets))
}

/// GET /api/dashboard/widgets/{id}
pub async fn get_widget(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let widget = WidgetRepo::get(state.store.as_ref(), &identity, &id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found(WIDGET, &id)))?;
    Ok(Json(widget))
}

/// POST /api/dashboard/widgets
pub async fn create_widget(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateWidget>,
) -> AppResult<impl IntoResponse> {
    let widget = WidgetRepo::create(state.store.as_ref(), &identity, input).await?;

    tracing::info!(
        user_id = %identity.user_id,
        widget_id = %widget.id,
        query_id = %widget.query_id,
        "Widget created",
    );

    Ok((StatusCode::CREATED, Json(widget)))
}

/// PUT /api/dashboard/widgets/{id}
pub async fn update_widget(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateWidget>,
) -> AppResult<impl IntoResponse> {
    let widget = WidgetRepo::update(state.store.as_ref(), &identity, &id, input)
        .await?
        .ok_or(AppError::Core(CoreError::not_found(WIDGET, &id)))?;

    tracing::info!(user_id = %identity.user_id, widget_id = %id, "Widget updated");

    Ok(Json(widget))
}

/// DELETE /api/dashboard/widgets/{id}
pub async fn delete_widget(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !WidgetRepo::delete(state.store.as_ref(), &identity, &id).await? {
        return Err(AppError::Core(CoreError::not_found(WIDGET, &id)));
    }

    tracing::info!(user_id = %identity.user_id, widget_id = %id, "Widget deleted");

    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Reorder
// ---------------------------------------------------------------------------

/// PUT /api/dashboard/widgets/positions
///
/// Body `{ids: [string]}`. Each listed widget takes its index as position.
/// Unknown ids are reported, not rejected.
pub async fn reorder_widgets(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<ReorderWidgets>,
) -> AppResult<impl IntoResponse> {
    let ids = input
        .ids
        .ok_or_else(|| AppError::BadRequest("ids array required".into()))?;

    let outcome = WidgetRepo::reorder(state.store.as_ref(), &identity, &ids).await;

    tracing::info!(
        user_id = %identity.user_id,
        updated = outcome.updated.len(),
        missing = outcome.missing.len(),
        failed = outcome.failed.len(),
        "Widgets reordered",
    );

    Ok(Json(outcome))
}
