/// Task lifecycle and column movement
///
/// New tasks always start in the project's `BACKLOG` column. The column only
/// changes through [`TaskService::move_to_column`], which also keeps
/// `completed_at` in step with the `DONE` column.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use teamboard_shared::services::tasks::{TaskDraft, TaskService};
/// use teamboard_shared::store::{memory::MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// let tasks = TaskService::new(store);
///
/// // Fails: the project does not exist
/// assert!(tasks.create(TaskDraft::titled("Ship it"), 42, 1).await.is_err());
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use super::error::{require_non_blank, ServiceError, ServiceResult};
use crate::models::board_column::{BoardColumn, ColumnName};
use crate::models::task::{NewTask, Priority, Task, TaskChanges};
use crate::store::Store;

const TITLE_REQUIRED: &str = "Task title is required";

/// Caller-supplied task fields, shared by create and update
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    /// `None` means `MEDIUM`
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    /// `None` leaves the task unassigned
    pub assigned_to_id: Option<i64>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn backlog_of(&self, project_id: i64) -> ServiceResult<BoardColumn> {
        self.store
            .list_columns(project_id)
            .await?
            .into_iter()
            .find(|c| c.name == ColumnName::Backlog)
            .ok_or_else(|| ServiceError::NotFound("Backlog column not found for project".to_string()))
    }

    /// Creates a task in the project's `BACKLOG` column
    ///
    /// An assignee that does not resolve to a user is dropped and the task is
    /// created unassigned.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project or its backlog column does not exist
    /// - `Validation` if the title is blank
    pub async fn create(&self, draft: TaskDraft, project_id: i64, creator_id: i64) -> ServiceResult<Task> {
        if self.store.find_project(project_id).await?.is_none() {
            return Err(ServiceError::not_found("Project", project_id));
        }
        let backlog = self.backlog_of(project_id).await?;
        require_non_blank(&draft.title, TITLE_REQUIRED)?;

        let assigned_to_id = match draft.assigned_to_id {
            Some(user_id) => {
                let found = self.store.find_user(user_id).await?.map(|u| u.id);
                if found.is_none() {
                    debug!(user_id, project_id, "Ignoring unknown assignee on task create");
                }
                found
            }
            None => None,
        };

        let task = self
            .store
            .create_task(NewTask {
                title: draft.title.trim().to_string(),
                description: draft.description,
                project_id,
                column_id: backlog.id,
                assigned_to_id,
                priority: draft.priority.unwrap_or_default(),
                due_date: draft.due_date,
                created_by_id: creator_id,
            })
            .await?;

        info!(task_id = task.id, project_id, creator_id, "Task created");
        Ok(task)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Task> {
        self.store
            .find_task(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", id))
    }

    /// Replaces title, description, priority, due date and assignee
    ///
    /// Project and column never change here.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task or the given assignee does not exist
    /// - `Validation` if the title is blank
    pub async fn update(&self, id: i64, draft: TaskDraft) -> ServiceResult<Task> {
        self.get(id).await?;
        require_non_blank(&draft.title, TITLE_REQUIRED)?;

        if let Some(user_id) = draft.assigned_to_id {
            if self.store.find_user(user_id).await?.is_none() {
                return Err(ServiceError::not_found("User", user_id));
            }
        }

        let task = self
            .store
            .update_task(
                id,
                TaskChanges {
                    title: draft.title.trim().to_string(),
                    description: draft.description,
                    priority: draft.priority.unwrap_or_default(),
                    due_date: draft.due_date,
                    assigned_to_id: draft.assigned_to_id,
                },
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", id))?;

        info!(task_id = id, "Task updated");
        Ok(task)
    }

    /// Moves a task to another column of the same project
    ///
    /// Moving to the column the task is already in returns it unchanged
    /// without writing. Entering `DONE` stamps `completed_at`; leaving it
    /// clears the stamp.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task or column does not exist
    /// - `Validation` if the column belongs to another project
    pub async fn move_to_column(&self, task_id: i64, column_id: i64) -> ServiceResult<Task> {
        let task = self.get(task_id).await?;
        let column = self
            .store
            .find_column(column_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Column", column_id))?;

        if column.project_id != task.project_id {
            return Err(ServiceError::Validation(
                "Column does not belong to task's project".to_string(),
            ));
        }

        if task.column_id == column_id {
            debug!(task_id, column_id, "Task already in target column");
            return Ok(task);
        }

        let completed_at = match column.name {
            ColumnName::Done => Some(task.completed_at.unwrap_or_else(Utc::now)),
            _ => None,
        };

        let moved = self
            .store
            .set_task_column(task_id, column_id, completed_at)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", task_id))?;

        info!(
            task_id,
            from_column = task.column_id,
            to_column = column_id,
            column = column.name.as_str(),
            "Task moved"
        );
        Ok(moved)
    }

    /// Sets or clears the assignee
    ///
    /// # Errors
    ///
    /// `NotFound` if the task, or a non-null user, does not exist
    pub async fn assign(&self, task_id: i64, user_id: Option<i64>) -> ServiceResult<Task> {
        self.get(task_id).await?;

        if let Some(user_id) = user_id {
            if self.store.find_user(user_id).await?.is_none() {
                return Err(ServiceError::not_found("User", user_id));
            }
        }

        let task = self
            .store
            .set_task_assignee(task_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Task", task_id))?;

        info!(task_id, assigned_to_id = ?user_id, "Task assignee changed");
        Ok(task)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.store.delete_task(id).await? {
            return Err(ServiceError::not_found("Task", id));
        }

        info!(task_id = id, "Task deleted");
        Ok(())
    }

    /// Tasks of a project, newest first
    pub async fn list_by_project(&self, project_id: i64) -> ServiceResult<Vec<Task>> {
        if self.store.find_project(project_id).await?.is_none() {
            return Err(ServiceError::not_found("Project", project_id));
        }
        Ok(self.store.list_tasks_by_project(project_id).await?)
    }

    /// Tasks in a column, newest first
    pub async fn list_by_column(&self, column_id: i64) -> ServiceResult<Vec<Task>> {
        if self.store.find_column(column_id).await?.is_none() {
            return Err(ServiceError::not_found("Column", column_id));
        }
        Ok(self.store.list_tasks_by_column(column_id).await?)
    }
}
