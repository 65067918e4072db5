use crate::database::todo::TodoRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::todo::{Todo, TodoFilter};
use crate::models::user::User;
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory stand-in for the Postgres user repository, mirroring its
/// contract including the duplicate-email conflict.
#[derive(Default)]
pub struct MockUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait::async_trait]
impl UserRepository for MockUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::UserAlreadyExists(user.email.clone()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.users.lock().unwrap().iter().any(|u| u.email == email))
    }

    async fn delete_user(&self, id: &Uuid) -> Result<(), AppError> {
        self.users.lock().unwrap().retain(|u| u.id != *id);
        Ok(())
    }
}

/// In-memory stand-in for the Postgres todo repository. Filtering and
/// ordering follow the same semantics as the SQL builder.
#[derive(Default)]
pub struct MockTodoRepository {
    todos: Mutex<Vec<Todo>>,
}

impl MockTodoRepository {
    fn matching(&self, filter: &TodoFilter) -> Vec<Todo> {
        let todos = self.todos.lock().unwrap();
        todos
            .iter()
            .filter(|t| filter.user_id.is_none_or(|user_id| t.user_id == user_id))
            .filter(|t| filter.status.is_none_or(|status| t.status == status))
            .filter(|t| filter.priority.is_none_or(|priority| t.priority == priority))
            .filter(|t| filter.due_date_from.is_none_or(|from| t.due_date.is_some_and(|due| due >= from)))
            .filter(|t| filter.due_date_to.is_none_or(|to| t.due_date.is_some_and(|due| due <= to)))
            .filter(|t| {
                filter.search.as_deref().is_none_or(|search| {
                    let needle = search.to_lowercase();
                    t.title.to_lowercase().contains(&needle) || t.description.to_lowercase().contains(&needle)
                })
            })
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl TodoRepository for MockTodoRepository {
    async fn create_todo(&self, todo: &Todo) -> Result<(), AppError> {
        self.todos.lock().unwrap().push(todo.clone());
        Ok(())
    }

    async fn get_todo_by_user_and_id(&self, user_id: &Uuid, todo_id: &Uuid) -> Result<Option<Todo>, AppError> {
        let todos = self.todos.lock().unwrap();
        Ok(todos.iter().find(|t| t.user_id == *user_id && t.id == *todo_id).cloned())
    }

    async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Todo>, AppError> {
        let mut matched = self.matching(filter);

        match filter.sort_by.as_deref() {
            Some("title") => matched.sort_by(|a, b| a.title.cmp(&b.title)),
            Some("due_date") => matched.sort_by_key(|t| t.due_date),
            Some("updated_at") => matched.sort_by_key(|t| t.updated_at),
            _ => matched.sort_by_key(|t| std::cmp::Reverse(t.created_at)),
        }
        if filter.sort_order.as_deref().is_some_and(|o| o.eq_ignore_ascii_case("desc"))
            && filter.sort_by.is_some()
        {
            matched.reverse();
        }

        let start = (filter.offset.max(0) as usize).min(matched.len());
        let end = match filter.limit {
            Some(limit) => (start + limit.max(0) as usize).min(matched.len()),
            None => matched.len(),
        };

        Ok(matched[start..end].to_vec())
    }

    async fn count_todos(&self, filter: &TodoFilter) -> Result<i64, AppError> {
        Ok(self.matching(filter).len() as i64)
    }

    async fn update_todo(&self, todo: &Todo) -> Result<(), AppError> {
        let mut todos = self.todos.lock().unwrap();
        if let Some(existing) = todos.iter_mut().find(|t| t.id == todo.id) {
            *existing = todo.clone();
        }
        Ok(())
    }

    async fn delete_todo(&self, id: &Uuid) -> Result<(), AppError> {
        self.todos.lock().unwrap().retain(|t| t.id != *id);
        Ok(())
    }
}
