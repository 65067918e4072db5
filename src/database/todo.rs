use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::todo::{Todo, TodoFilter, TodoPriority, TodoStatus};
use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait TodoRepository {
    async fn create_todo(&self, todo: &Todo) -> Result<(), AppError>;
    async fn get_todo_by_user_and_id(&self, user_id: &Uuid, todo_id: &Uuid) -> Result<Option<Todo>, AppError>;
    async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Todo>, AppError>;
    async fn count_todos(&self, filter: &TodoFilter) -> Result<i64, AppError>;
    async fn update_todo(&self, todo: &Todo) -> Result<(), AppError>;
    async fn delete_todo(&self, id: &Uuid) -> Result<(), AppError>;
}

/// Row shape as stored; status/priority live in TEXT columns.
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: String,
    status: String,
    priority: String,
    due_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<TodoRow> for Todo {
    type Error = AppError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let status = TodoStatus::parse(&row.status)
            .ok_or_else(|| AppError::db("Failed to decode todo row", sqlx::Error::Decode(format!("unknown todo status: {}", row.status).into())))?;
        let priority = TodoPriority::parse(&row.priority)
            .ok_or_else(|| AppError::db("Failed to decode todo row", sqlx::Error::Decode(format!("unknown todo priority: {}", row.priority).into())))?;

        Ok(Todo {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            status,
            priority,
            due_date: row.due_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT id, user_id, title, description, status, priority, due_date, created_at, updated_at, completed_at FROM todos";

/// Sort columns accepted from callers; anything else falls back to the
/// default ordering rather than reaching the ORDER BY clause.
const SORT_COLUMNS: [&str; 6] = ["created_at", "updated_at", "due_date", "priority", "status", "title"];

fn order_by_clause(filter: &TodoFilter) -> String {
    let column = filter
        .sort_by
        .as_deref()
        .and_then(|requested| SORT_COLUMNS.iter().find(|c| c.eq_ignore_ascii_case(requested)))
        .copied();

    match column {
        Some(column) => {
            let direction = match filter.sort_order.as_deref() {
                Some(order) if order.eq_ignore_ascii_case("desc") => "DESC",
                _ => "ASC",
            };
            format!("{} {}", column, direction)
        }
        None => "created_at DESC".to_string(),
    }
}

/// Appends one parameterized predicate per present filter field.
fn apply_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &TodoFilter) {
    let mut first = true;
    let mut separator = move || if std::mem::take(&mut first) { " WHERE " } else { " AND " };

    if let Some(user_id) = filter.user_id {
        qb.push(separator()).push("user_id = ").push_bind(user_id);
    }
    if let Some(status) = filter.status {
        qb.push(separator()).push("status = ").push_bind(status.as_str());
    }
    if let Some(priority) = filter.priority {
        qb.push(separator()).push("priority = ").push_bind(priority.as_str());
    }
    if let Some(from) = filter.due_date_from {
        qb.push(separator()).push("due_date >= ").push_bind(from);
    }
    if let Some(to) = filter.due_date_to {
        qb.push(separator()).push("due_date <= ").push_bind(to);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(separator())
            .push("(title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait::async_trait]
impl TodoRepository for PostgresRepository {
    async fn create_todo(&self, todo: &Todo) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO todos (id, user_id, title, description, status, priority, due_date, created_at, updated_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(todo.id)
        .bind(todo.user_id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.status.as_str())
        .bind(todo.priority.as_str())
        .bind(todo.due_date)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .bind(todo.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to create todo", e))?;

        Ok(())
    }

    async fn get_todo_by_user_and_id(&self, user_id: &Uuid, todo_id: &Uuid) -> Result<Option<Todo>, AppError> {
        let row = sqlx::query_as::<_, TodoRow>(&format!("{} WHERE user_id = $1 AND id = $2", SELECT_COLUMNS))
            .bind(user_id)
            .bind(todo_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to fetch todo", e))?;

        row.map(Todo::try_from).transpose()
    }

    async fn list_todos(&self, filter: &TodoFilter) -> Result<Vec<Todo>, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_COLUMNS);
        apply_filter(&mut qb, filter);
        qb.push(" ORDER BY ").push(order_by_clause(filter));
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit).push(" OFFSET ").push_bind(filter.offset);
        }

        let rows: Vec<TodoRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to list todos", e))?;

        rows.into_iter().map(Todo::try_from).collect()
    }

    async fn count_todos(&self, filter: &TodoFilter) -> Result<i64, AppError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM todos");
        apply_filter(&mut qb, filter);

        qb.build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to count todos", e))
    }

    async fn update_todo(&self, todo: &Todo) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE todos
            SET title = $1, description = $2, status = $3, priority = $4, due_date = $5, updated_at = $6, completed_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.status.as_str())
        .bind(todo.priority.as_str())
        .bind(todo.due_date)
        .bind(todo.updated_at)
        .bind(todo.completed_at)
        .bind(todo.id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::db("Failed to update todo", e))?;

        Ok(())
    }

    async fn delete_todo(&self, id: &Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::db("Failed to delete todo", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_filter() -> TodoFilter {
        TodoFilter {
            user_id: Some(Uuid::new_v4()),
            status: Some(TodoStatus::Pending),
            priority: Some(TodoPriority::High),
            due_date_from: Some(Utc::now()),
            due_date_to: Some(Utc::now()),
            search: Some("milk".to_string()),
            limit: Some(10),
            offset: 0,
            sort_by: None,
            sort_order: None,
        }
    }

    #[test]
    fn filter_emits_one_predicate_per_present_field() {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_COLUMNS);
        apply_filter(&mut qb, &full_filter());
        let sql = qb.sql();

        assert!(sql.contains("WHERE user_id = $1"));
        assert!(sql.contains("AND status = $2"));
        assert!(sql.contains("AND priority = $3"));
        assert!(sql.contains("AND due_date >= $4"));
        assert!(sql.contains("AND due_date <= $5"));
        assert!(sql.contains("(title ILIKE $6 OR description ILIKE $7)"));
    }

    #[test]
    fn empty_filter_emits_no_where_clause() {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM todos");
        apply_filter(&mut qb, &TodoFilter::default());
        assert!(!qb.sql().contains("WHERE"));
    }

    #[test]
    fn sort_columns_are_allow_listed() {
        let mut filter = TodoFilter::default();
        assert_eq!(order_by_clause(&filter), "created_at DESC");

        filter.sort_by = Some("due_date".to_string());
        filter.sort_order = Some("asc".to_string());
        assert_eq!(order_by_clause(&filter), "due_date ASC");

        filter.sort_order = Some("DESC".to_string());
        assert_eq!(order_by_clause(&filter), "due_date DESC");
    }

    #[test]
    fn unknown_sort_column_falls_back_to_default() {
        let filter = TodoFilter {
            sort_by: Some("title; DROP TABLE todos--".to_string()),
            sort_order: Some("asc".to_string()),
            ..TodoFilter::default()
        };
        assert_eq!(order_by_clause(&filter), "created_at DESC");
    }

    #[test]
    fn unknown_sort_direction_defaults_to_ascending() {
        let filter = TodoFilter {
            sort_by: Some("title".to_string()),
            sort_order: Some("sideways".to_string()),
            ..TodoFilter::default()
        };
        assert_eq!(order_by_clause(&filter), "title ASC");
    }

    #[test]
    fn row_decoding_rejects_unknown_status() {
        let row = TodoRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "t".to_string(),
            description: String::new(),
            status: "archived".to_string(),
            priority: "low".to_string(),
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            completed_at: None,
        };
        assert!(Todo::try_from(row).is_err());
    }
}
