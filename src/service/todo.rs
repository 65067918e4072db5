use crate::database::todo::TodoRepository;
use crate::error::app_error::AppError;
use crate::models::todo::{CreateTodoRequest, Todo, TodoFilter, TodoPriority, TodoStatus, UpdateTodoRequest};
use chrono::Utc;
use uuid::Uuid;

pub struct TodoService<'a, R: TodoRepository> {
    repo: &'a R,
}

impl<'a, R: TodoRepository> TodoService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        TodoService { repo }
    }

    pub async fn create_todo(&self, user_id: Uuid, request: &CreateTodoRequest) -> Result<Todo, AppError> {
        let todo = Todo::new(
            user_id,
            request.title.clone(),
            request.description.clone(),
            request.priority.unwrap_or(TodoPriority::Medium),
            request.due_date,
        );

        self.repo.create_todo(&todo).await?;
        Ok(todo)
    }

    /// Ownership is enforced by querying on the (user, id) pair; a todo
    /// belonging to another user is indistinguishable from a nonexistent one.
    pub async fn get_user_todo(&self, user_id: &Uuid, todo_id: &Uuid) -> Result<Todo, AppError> {
        self.repo
            .get_todo_by_user_and_id(user_id, todo_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))
    }

    /// List plus count are two independent statements against the same
    /// filter; the total may drift from the page under concurrent writes.
    pub async fn list_todos(&self, filter: &TodoFilter) -> Result<(Vec<Todo>, i64), AppError> {
        let todos = self.repo.list_todos(filter).await?;
        let count = self.repo.count_todos(filter).await?;
        Ok((todos, count))
    }

    pub async fn update_todo(&self, user_id: &Uuid, todo_id: &Uuid, changes: &UpdateTodoRequest) -> Result<Todo, AppError> {
        let mut todo = self.get_user_todo(user_id, todo_id).await?;

        if let Some(title) = &changes.title {
            todo.set_title(title.clone());
        }
        if let Some(description) = &changes.description {
            todo.set_description(description.clone());
        }
        if let Some(status) = changes.status {
            todo.set_status(status);
        }
        if let Some(priority) = changes.priority {
            todo.set_priority(priority);
        }
        if let Some(due_date) = changes.due_date {
            todo.set_due_date(Some(due_date));
        }

        self.repo.update_todo(&todo).await?;
        Ok(todo)
    }

    pub async fn delete_todo(&self, user_id: &Uuid, todo_id: &Uuid) -> Result<(), AppError> {
        let todo = self.get_user_todo(user_id, todo_id).await?;
        self.repo.delete_todo(&todo.id).await
    }

    /// The repository only bounds the due date; terminal statuses are
    /// filtered here, keeping the query status-agnostic.
    pub async fn get_overdue_todos(&self, user_id: &Uuid) -> Result<Vec<Todo>, AppError> {
        let filter = TodoFilter {
            user_id: Some(*user_id),
            due_date_to: Some(Utc::now()),
            sort_by: Some("due_date".to_string()),
            sort_order: Some("asc".to_string()),
            ..TodoFilter::default()
        };

        let todos = self.repo.list_todos(&filter).await?;
        Ok(todos
            .into_iter()
            .filter(|todo| todo.status != TodoStatus::Completed && todo.status != TodoStatus::Cancelled)
            .collect())
    }
}
