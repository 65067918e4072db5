use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::middleware::RequestId;
use crate::models::pagination::{PageMeta, PageParams};
use crate::models::response::{ApiResponse, PaginatedResponse};
use crate::models::todo::{CreateTodoRequest, TodoFilter, TodoPriority, TodoResponse, TodoStatus, UpdateTodoRequest};
use crate::service::todo::TodoService;
use chrono::{DateTime, Utc};
use rocket::FromForm;
use rocket::serde::json::Json;
use rocket::{State, http::Status, routes};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, FromForm)]
pub struct TodoListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub status: Option<TodoStatus>,
    pub priority: Option<TodoPriority>,
    pub search: Option<String>,
    pub due_date_from: Option<String>,
    pub due_date_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn parse_date(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>, AppError> {
    value
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| AppError::BadRequest(format!("{} must be an RFC 3339 timestamp", field)))
        })
        .transpose()
}

#[rocket::post("/", data = "<payload>")]
pub async fn create_todo(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    request_id: RequestId,
    payload: Json<CreateTodoRequest>,
) -> Result<(Status, Json<ApiResponse<TodoResponse>>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let service = TodoService::new(&repo);
    let todo = service.create_todo(current_user.id, &payload).await?;

    let body = ApiResponse::success("Todo created successfully", TodoResponse::from(&todo)).with_request_id(request_id.0);
    Ok((Status::Created, Json(body)))
}

#[rocket::get("/?<params..>")]
pub async fn list_todos(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    request_id: RequestId,
    params: TodoListParams,
) -> Result<Json<PaginatedResponse<TodoResponse>>, AppError> {
    let pagination = PageParams {
        page: params.page,
        page_size: params.page_size,
    };

    let filter = TodoFilter {
        user_id: Some(current_user.id),
        status: params.status,
        priority: params.priority,
        due_date_from: parse_date(params.due_date_from.as_deref(), "due_date_from")?,
        due_date_to: parse_date(params.due_date_to.as_deref(), "due_date_to")?,
        search: params.search,
        limit: Some(pagination.page_size()),
        offset: pagination.offset(),
        sort_by: params.sort_by,
        sort_order: params.sort_order,
    };

    let repo = PostgresRepository::new(pool.inner().clone());
    let service = TodoService::new(&repo);
    let (todos, count) = service.list_todos(&filter).await?;

    let data: Vec<TodoResponse> = todos.iter().map(TodoResponse::from).collect();
    let meta = PageMeta::new(count, pagination.page(), pagination.page_size());
    Ok(Json(PaginatedResponse::new("Todos retrieved successfully", data, meta).with_request_id(request_id.0)))
}

#[rocket::get("/overdue")]
pub async fn overdue_todos(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    request_id: RequestId,
) -> Result<Json<ApiResponse<Vec<TodoResponse>>>, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    let service = TodoService::new(&repo);
    let todos = service.get_overdue_todos(&current_user.id).await?;

    let data: Vec<TodoResponse> = todos.iter().map(TodoResponse::from).collect();
    Ok(Json(ApiResponse::success("Overdue todos retrieved successfully", data).with_request_id(request_id.0)))
}

#[rocket::get("/<id>")]
pub async fn get_todo(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    request_id: RequestId,
    id: &str,
) -> Result<Json<ApiResponse<TodoResponse>>, AppError> {
    let todo_id = Uuid::parse_str(id)?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let service = TodoService::new(&repo);
    let todo = service.get_user_todo(&current_user.id, &todo_id).await?;

    Ok(Json(ApiResponse::success("Todo retrieved successfully", TodoResponse::from(&todo)).with_request_id(request_id.0)))
}

#[rocket::put("/<id>", data = "<payload>")]
pub async fn update_todo(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    request_id: RequestId,
    id: &str,
    payload: Json<UpdateTodoRequest>,
) -> Result<Json<ApiResponse<TodoResponse>>, AppError> {
    payload.validate()?;
    let todo_id = Uuid::parse_str(id)?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let service = TodoService::new(&repo);
    let todo = service.update_todo(&current_user.id, &todo_id, &payload).await?;

    Ok(Json(ApiResponse::success("Todo updated successfully", TodoResponse::from(&todo)).with_request_id(request_id.0)))
}

#[rocket::delete("/<id>")]
pub async fn delete_todo(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    request_id: RequestId,
    id: &str,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let todo_id = Uuid::parse_str(id)?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let service = TodoService::new(&repo);
    service.delete_todo(&current_user.id, &todo_id).await?;

    Ok(Json(ApiResponse::message_only("Todo deleted successfully").with_request_id(request_id.0)))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![create_todo, list_todos, overdue_todos, get_todo, update_todo, delete_todo]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_rfc3339() {
        let parsed = parse_date(Some("2026-08-29T12:00:00Z"), "due_date_from").expect("parses");
        assert!(parsed.is_some());
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date(Some("29/08/2026"), "due_date_from").is_err());
        assert!(parse_date(Some("tomorrow"), "due_date_to").is_err());
    }

    #[test]
    fn parse_date_passes_through_absent_values() {
        assert!(parse_date(None, "due_date_from").expect("ok").is_none());
    }
}
