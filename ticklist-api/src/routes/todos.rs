/// Member-scoped todo endpoints
///
/// Every route here sits behind the member auth layer; handlers receive the
/// resolved principal from request extensions and the owner of every record
/// is forced to it. Request bodies carry no owner field at all.
///
/// # Endpoints
///
/// - `POST   /todos` - create `{title}`
/// - `GET    /todos/:todo_id` - fetch one record
/// - `PUT    /todos/:todo_id` - update `{title?, status?}`
/// - `DELETE /todos/:todo_id` - delete one record
/// - `DELETE /todos` - delete everything owned by the caller
/// - `POST   /todos/search` - filtered/sorted/paginated listing

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use ticklist_shared::auth::Principal;
use ticklist_shared::models::{Todo, TodoStatus};
use ticklist_shared::page::Page;
use ticklist_shared::todos::{query::TodoSearch, TodoUpdate};

use crate::{app::AppState, error::ApiResult};

/// Create request
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    /// Title; trimmed server-side, 1-255 characters after trimming
    pub title: String,
}

/// Update request; at least one field must be present
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    /// Replacement title
    pub title: Option<String>,

    /// Replacement status
    pub status: Option<TodoStatus>,
}

/// Creates a record owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let todo = state.todos.create(&principal, &req.title).await?;
    Ok(Json(todo))
}

/// Fetches one record the caller owns.
///
/// A record owned by someone else yields the same 404 as a record that does
/// not exist.
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(todo_id): Path<Uuid>,
) -> ApiResult<Json<Todo>> {
    let todo = state.todos.get(&principal, todo_id).await?;
    Ok(Json(todo))
}

/// Updates title and/or status of one owned record.
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(todo_id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> ApiResult<Json<Todo>> {
    let todo = state
        .todos
        .update(
            &principal,
            todo_id,
            TodoUpdate {
                title: req.title,
                status: req.status,
            },
        )
        .await?;
    Ok(Json(todo))
}

/// Deletes one owned record.
pub async fn delete_by_id(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(todo_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.todos.delete(&principal, todo_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes every record the caller owns. Idempotent.
pub async fn delete_all(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<StatusCode> {
    let deleted = state.todos.delete_all(&principal).await?;
    tracing::debug!(deleted, "bulk todo delete");
    Ok(StatusCode::NO_CONTENT)
}

/// Searches the caller's records.
pub async fn search(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(query): Json<TodoSearch>,
) -> ApiResult<Json<Page<Todo>>> {
    let page = state.todos.search(&principal, &query).await?;
    Ok(Json(page))
}
