/// Task model and database operations
///
/// A task belongs to exactly one project and sits in exactly one of that
/// project's columns. New tasks always start in `BACKLOG`; the column only
/// changes through an explicit move, and the project never changes.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('LOW', 'MEDIUM', 'HIGH');
///
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     project_id BIGINT NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
///     column_id BIGINT NOT NULL REFERENCES board_columns (id) ON DELETE CASCADE,
///     assigned_to_id BIGINT REFERENCES users (id) ON DELETE SET NULL,
///     priority task_priority NOT NULL DEFAULT 'MEDIUM',
///     due_date DATE,
///     created_by_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     completed_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use teamboard_shared::models::task::{NewTask, Priority, Task};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, project_id: i64, backlog_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, NewTask {
///     title: "Write release notes".to_string(),
///     description: None,
///     project_id,
///     column_id: backlog_id,
///     assigned_to_id: None,
///     priority: Priority::High,
///     due_date: None,
///     created_by_id: user_id,
/// })
/// .await?;
///
/// let tasks = Task::list_by_project(&pool, project_id).await?;
/// assert_eq!(tasks[0].id, task.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// A task row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub project_id: i64,
    pub column_id: i64,
    pub assigned_to_id: Option<i64>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_by_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set while the task sits in the `DONE` column
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub project_id: i64,
    pub column_id: i64,
    pub assigned_to_id: Option<i64>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_by_id: i64,
}

/// Fields replaced by a task update
///
/// Project and column are deliberately absent.
#[derive(Debug, Clone)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to_id: Option<i64>,
}

const COLUMNS: &str = "id, title, description, project_id, column_id, assigned_to_id, priority, \
                       due_date, created_by_id, created_at, updated_at, completed_at";

impl Task {
    pub async fn create<'e, E>(executor: E, data: NewTask) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, project_id, column_id, assigned_to_id,
                               priority, due_date, created_by_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.column_id)
        .bind(data.assigned_to_id)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.created_by_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!("SELECT {COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Tasks of a project, newest first
    pub async fn list_by_project<'e, E>(executor: E, project_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(project_id)
        .fetch_all(executor)
        .await
    }

    /// Tasks in a column, newest first
    pub async fn list_by_column<'e, E>(executor: E, column_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {COLUMNS} FROM tasks WHERE column_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(column_id)
        .fetch_all(executor)
        .await
    }

    pub async fn update<'e, E>(executor: E, id: i64, changes: TaskChanges) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, priority = $4, due_date = $5, assigned_to_id = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.priority)
        .bind(changes.due_date)
        .bind(changes.assigned_to_id)
        .fetch_optional(executor)
        .await
    }

    /// Moves a task to another column, recording the completion timestamp
    pub async fn set_column<'e, E>(
        executor: E,
        id: i64,
        column_id: i64,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks SET column_id = $2, completed_at = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(column_id)
        .bind(completed_at)
        .fetch_optional(executor)
        .await
    }

    pub async fn set_assignee<'e, E>(
        executor: E,
        id: i64,
        assigned_to_id: Option<i64>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET assigned_to_id = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(assigned_to_id)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_wire_format() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"HIGH\"");
        let low: Priority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(low, Priority::Low);
        assert!(serde_json::from_str::<Priority>("\"URGENT\"").is_err());
    }
}
