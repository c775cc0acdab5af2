/// Persistence abstraction
///
/// Services talk to storage only through the [`Store`] trait, so the same
/// lifecycle rules run against PostgreSQL in production and against the
/// in-memory backend in tests or when no database is configured.
///
/// # Backends
///
/// - [`postgres::PgStore`]: sqlx/PostgreSQL, delegating to the SQL in [`crate::models`]
/// - [`memory::MemoryStore`]: mutex-guarded maps with the same uniqueness and
///   cascade behavior as the schema
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use teamboard_shared::store::{memory::MemoryStore, Store};
///
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// assert_eq!(store.backend_name(), "memory");
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::board_column::BoardColumn;
use crate::models::membership::{Member, MemberRole};
use crate::models::project::{NewProject, Project};
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{NewUser, User};
use crate::models::workspace::{NewWorkspace, Workspace};

pub mod memory;
pub mod postgres;

/// PostgreSQL SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness rule was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend failed
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage backend for every TeamBoard entity
///
/// Lookups return `Ok(None)` for absent rows; mutations of a row that does
/// not exist return `Ok(None)` or `Ok(false)`. Uniqueness violations surface
/// as [`StoreError::Conflict`].
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend identifier for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;

    // Users

    async fn create_user(&self, data: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Loads the users with the given IDs, skipping unknown ones
    async fn find_users(&self, ids: &[i64]) -> StoreResult<Vec<User>>;
    async fn update_user(&self, user: &User) -> StoreResult<Option<User>>;

    // Workspaces

    async fn create_workspace(&self, data: NewWorkspace) -> StoreResult<Workspace>;
    async fn find_workspace(&self, id: i64) -> StoreResult<Option<Workspace>>;
    async fn find_workspace_by_owner_and_name(
        &self,
        owner_id: i64,
        name: &str,
    ) -> StoreResult<Option<Workspace>>;
    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>>;
    async fn list_workspaces_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Workspace>>;
    /// Case-insensitive substring match on the name
    async fn search_workspaces(&self, text: &str) -> StoreResult<Vec<Workspace>>;
    async fn update_workspace(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Option<Workspace>>;
    /// Deletes the workspace together with its members, projects, columns and tasks
    async fn delete_workspace(&self, id: i64) -> StoreResult<bool>;

    // Members

    async fn create_member(&self, user_id: i64, workspace_id: i64, role: MemberRole) -> StoreResult<Member>;
    async fn find_member(&self, user_id: i64, workspace_id: i64) -> StoreResult<Option<Member>>;
    async fn list_members(&self, workspace_id: i64) -> StoreResult<Vec<Member>>;
    async fn list_memberships_of_user(&self, user_id: i64) -> StoreResult<Vec<Member>>;
    async fn update_member_role(
        &self,
        user_id: i64,
        workspace_id: i64,
        role: MemberRole,
    ) -> StoreResult<Option<Member>>;
    async fn delete_member(&self, user_id: i64, workspace_id: i64) -> StoreResult<bool>;

    // Projects

    /// Creates a project and its four default columns atomically
    async fn create_project_with_columns(&self, data: NewProject) -> StoreResult<(Project, Vec<BoardColumn>)>;
    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>>;
    async fn list_projects(&self, workspace_id: i64) -> StoreResult<Vec<Project>>;
    async fn update_project(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Option<Project>>;
    /// Deletes the project together with its columns and tasks
    async fn delete_project(&self, id: i64) -> StoreResult<bool>;

    // Columns

    /// Inserts the default columns; `Conflict` if the project already has columns
    async fn insert_default_columns(&self, project_id: i64) -> StoreResult<Vec<BoardColumn>>;
    async fn find_column(&self, id: i64) -> StoreResult<Option<BoardColumn>>;
    /// Columns ordered by position
    async fn list_columns(&self, project_id: i64) -> StoreResult<Vec<BoardColumn>>;

    // Tasks

    async fn create_task(&self, data: NewTask) -> StoreResult<Task>;
    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>>;
    /// Newest first
    async fn list_tasks_by_project(&self, project_id: i64) -> StoreResult<Vec<Task>>;
    /// Newest first
    async fn list_tasks_by_column(&self, column_id: i64) -> StoreResult<Vec<Task>>;
    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>>;
    async fn set_task_column(
        &self,
        id: i64,
        column_id: i64,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Task>>;
    async fn set_task_assignee(&self, id: i64, assigned_to_id: Option<i64>) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: i64) -> StoreResult<bool>;
}
