use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{http::StatusCode, Json};
use tracing::info;

use crate::db::{create_todo, delete_todo, get_todo, list_todos, update_todo};
use crate::error::AppError;
use crate::models::{CreateTodo, Deleted, Envelope, Todo, UpdateTodo};
use crate::AppState;

/// Ids are opaque to callers: anything that is not a stored id, including
/// text that is not a number at all, is simply not found.
fn parse_id(Path(raw): Path<String>) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

pub async fn list_all_todos(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Todo>>>, AppError> {
    let todos = list_todos(&state.db)?;
    info!(count = todos.len(), "Listed todos");
    Ok(Json(Envelope::new(todos)))
}

pub async fn create_new_todo(
    State(state): State<AppState>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Todo>>), AppError> {
    let Json(req) = payload?;
    let todo = create_todo(&state.db, &req)?;
    info!(id = todo.id, title = %todo.title, status = %todo.status, "Created todo");
    Ok((StatusCode::CREATED, Json(Envelope::new(todo))))
}

pub async fn get_single_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope<Todo>>, AppError> {
    let id = parse_id(id?)?;
    let todo = get_todo(&state.db, id)?;
    Ok(Json(Envelope::new(todo)))
}

pub async fn update_existing_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<UpdateTodo>, JsonRejection>,
) -> Result<Json<Envelope<Todo>>, AppError> {
    let id = parse_id(id?)?;
    let Json(req) = payload?;
    let todo = update_todo(&state.db, id, &req)?;
    info!(id = todo.id, status = %todo.status, "Updated todo");
    Ok(Json(Envelope::new(todo)))
}

pub async fn delete_existing_todo(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Envelope<Deleted>>, AppError> {
    let id = parse_id(id?)?;
    let id = delete_todo(&state.db, id)?;
    info!(id, "Deleted todo");
    Ok(Json(Envelope::new(Deleted { id })))
}
