/// Anonymous task endpoints
///
/// These routes serve the single implicit actor of the token-only context
/// and carry no authentication, matching the system's design: the task
/// table is also what anchors `user`-role tokens to a live session.
///
/// # Endpoints
///
/// - `GET    /tasks` - list everything
/// - `POST   /tasks` - create `{title}`
/// - `PATCH  /tasks/:task_id` - update `{is_completed}`
/// - `DELETE /tasks/:task_id` - delete

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use ticklist_shared::models::Task;
use ticklist_shared::page::Page;

use crate::{app::AppState, error::ApiResult};

/// Create request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Title; trimmed server-side, 1-500 characters after trimming
    pub title: String,
}

/// Update request
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New completion state
    pub is_completed: bool,
}

/// Lists every task in one page.
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Page<Task>>> {
    let page = state.tasks.list().await?;
    Ok(Json(page))
}

/// Creates a task.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.create(&req.title).await?;
    Ok(Json(task))
}

/// Toggles a task's completion flag.
pub async fn update(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task = state.tasks.set_completed(task_id, req.is_completed).await?;
    Ok(Json(task))
}

/// Deletes a task.
pub async fn delete_by_id(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
