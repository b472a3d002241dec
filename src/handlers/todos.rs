use crate::db::todo_repository::TodoRepository;
use crate::errors::ApiError;
use crate::models::todo::{Category, Todo};
use crate::models::user::Claims;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub text: Option<String>,
    pub category: Option<Category>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Partial update. Absent fields keep their stored value; `dueDate` is
/// double-optional so an explicit `null` clears it while absence keeps it.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Serialize, ToSchema)]
pub struct DeleteTodoResponse {
    pub message: String,
}

/// Load a todo and check the caller owns it. Missing ids and foreign ids
/// report differently: 404 for absent, 403 for present but not yours.
async fn owned_todo(
    todo_repo: &TodoRepository,
    id: &str,
    claims: &Claims,
) -> Result<Todo, ApiError> {
    let todo = todo_repo
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("Todo"))?;

    if todo.user_id != claims.sub {
        warn!(
            todo_id = %id,
            owner_id = %todo.user_id,
            caller_id = %claims.sub,
            "Rejected cross-user todo access"
        );
        return Err(ApiError::Forbidden);
    }

    Ok(todo)
}

/// List the authenticated user's todos
#[utoipa::path(
    get,
    path = "/api/todos",
    responses(
        (status = 200, description = "Todos for the authenticated user", body = [Todo]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Todos"
)]
pub async fn list_todos(
    todo_repo: web::Data<TodoRepository>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, ApiError> {
    let todos = todo_repo.list_by_owner(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(todos))
}

/// Create a todo owned by the authenticated user
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = Todo),
        (status = 400, description = "Missing text"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Todos"
)]
pub async fn create_todo(
    todo_repo: web::Data<TodoRepository>,
    claims: web::ReqData<Claims>,
    payload: web::Json<CreateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let text = payload
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Text is required".to_string()))?;

    // Owner comes from the verified token, never from the request body.
    let todo = Todo {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: claims.sub.clone(),
        text: text.to_string(),
        completed: false,
        category: payload.category.unwrap_or_default(),
        due_date: payload.due_date,
        created_at: Utc::now(),
    };

    let todo = todo_repo.create(todo).await?;

    info!(todo_id = %todo.id, user_id = %claims.sub, "Todo created");

    Ok(HttpResponse::Created().json(todo))
}

/// Update a todo owned by the authenticated user
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(
        ("id" = String, Path, description = "Todo id")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Updated todo", body = Todo),
        (status = 400, description = "Empty text"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Todos"
)]
pub async fn update_todo(
    todo_repo: web::Data<TodoRepository>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    payload: web::Json<UpdateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let mut todo = owned_todo(&todo_repo, &id, &claims).await?;

    if let Some(ref text) = payload.text {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ApiError::BadRequest("Text is required".to_string()));
        }
        todo.text = trimmed.to_string();
    }
    if let Some(completed) = payload.completed {
        todo.completed = completed;
    }
    if let Some(category) = payload.category {
        todo.category = category;
    }
    if let Some(due_date) = payload.due_date {
        todo.due_date = due_date;
    }

    let todo = todo_repo.update(todo).await?;

    info!(todo_id = %todo.id, user_id = %claims.sub, "Todo updated");

    Ok(HttpResponse::Ok().json(todo))
}

/// Delete a todo owned by the authenticated user
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(
        ("id" = String, Path, description = "Todo id")
    ),
    responses(
        (status = 200, description = "Todo deleted", body = DeleteTodoResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Todo belongs to another user"),
        (status = 404, description = "Todo not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Todos"
)]
pub async fn delete_todo(
    todo_repo: web::Data<TodoRepository>,
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let todo = owned_todo(&todo_repo, &id, &claims).await?;

    todo_repo.delete(&todo.id, &claims.sub).await?;

    info!(todo_id = %todo.id, user_id = %claims.sub, "Todo deleted");

    Ok(HttpResponse::Ok().json(DeleteTodoResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}
