use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    db::entities::todo,
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    routes::forms::{TodoForm, parse_id},
    services::{ServiceContext, todo_service::TodoService},
    state::AppState,
};

const CREATED_MESSAGE: &str = "Todo item created successfully!";
const UPDATED_MESSAGE: &str = "Todo updated successfully!";
const DELETED_MESSAGE: &str = "Todo deleted successfully!";

/// Wire shape of a todo. Timestamps and the delete marker stay server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoView {
    pub id: u32,
    pub title: String,
    pub completed: bool,
}

/// Only the exact value 1 counts as done.
pub fn int_to_bool(flag: i32) -> bool {
    flag == 1
}

impl From<todo::Model> for TodoView {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            completed: int_to_bool(model.completed),
        }
    }
}

// Literal paths so the build script can list them; the collection answers
// with and without the trailing slash.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/todos", post(create_todo).get(list_todos))
        .route("/api/v1/todos/", post(create_todo).get(list_todos))
        .route(
            "/api/v1/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .with_state(state)
}

async fn create_todo(State(state): State<Arc<AppState>>, form: TodoForm) -> ApiResult<()> {
    let service = todo_service_from_state(state.as_ref());
    let id = service.create(&form.title, form.completed_flag()).await?;
    JsonApiResponse::created(CREATED_MESSAGE, id)
}

async fn list_todos(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TodoView>> {
    let service = todo_service_from_state(state.as_ref());
    let todos = service.list().await?;
    JsonApiResponse::ok(todos.into_iter().map(TodoView::from).collect())
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TodoView> {
    let id = path_id(&id)?;
    let service = todo_service_from_state(state.as_ref());
    let todo = service.require(id).await?;
    JsonApiResponse::ok(todo.into())
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    form: TodoForm,
) -> ApiResult<()> {
    let id = path_id(&id)?;
    let service = todo_service_from_state(state.as_ref());
    service
        .update(id, &form.title, form.completed_flag())
        .await?;
    JsonApiResponse::message(UPDATED_MESSAGE)
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let id = path_id(&id)?;
    let service = todo_service_from_state(state.as_ref());
    service.delete(id).await?;
    JsonApiResponse::message(DELETED_MESSAGE)
}

fn path_id(raw: &str) -> Result<u32, AppError> {
    parse_id(raw).ok_or_else(AppError::todo_not_found)
}

fn todo_service_from_state(state: &AppState) -> TodoService {
    ServiceContext::from_state(state).todo()
}
