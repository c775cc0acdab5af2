//! PostgreSQL-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use super::{Store, StoreError, StoreResult};
use crate::db::pool::health_check;
use crate::models::board_column::BoardColumn;
use crate::models::membership::{Member, MemberRole};
use crate::models::project::{NewProject, Project};
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{NewUser, User};
use crate::models::workspace::{NewWorkspace, Workspace};

/// [`Store`] implementation over a sqlx connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for migrations and shutdown
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await.map_err(StoreError::Database)
    }

    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn find_users(&self, ids: &[i64]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(User::find_by_ids(&self.pool, ids).await?)
    }

    async fn update_user(&self, user: &User) -> StoreResult<Option<User>> {
        Ok(User::update(&self.pool, user).await?)
    }

    async fn create_workspace(&self, data: NewWorkspace) -> StoreResult<Workspace> {
        Ok(Workspace::create(&self.pool, data).await?)
    }

    async fn find_workspace(&self, id: i64) -> StoreResult<Option<Workspace>> {
        Ok(Workspace::find_by_id(&self.pool, id).await?)
    }

    async fn find_workspace_by_owner_and_name(
        &self,
        owner_id: i64,
        name: &str,
    ) -> StoreResult<Option<Workspace>> {
        Ok(Workspace::find_by_owner_and_name(&self.pool, owner_id, name).await?)
    }

    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>> {
        Ok(Workspace::list(&self.pool).await?)
    }

    async fn list_workspaces_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Workspace>> {
        Ok(Workspace::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn search_workspaces(&self, text: &str) -> StoreResult<Vec<Workspace>> {
        Ok(Workspace::search_by_name(&self.pool, text).await?)
    }

    async fn update_workspace(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Option<Workspace>> {
        Ok(Workspace::update(&self.pool, id, name, description).await?)
    }

    async fn delete_workspace(&self, id: i64) -> StoreResult<bool> {
        Ok(Workspace::delete(&self.pool, id).await?)
    }

    async fn create_member(&self, user_id: i64, workspace_id: i64, role: MemberRole) -> StoreResult<Member> {
        Ok(Member::create(&self.pool, user_id, workspace_id, role).await?)
    }

    async fn find_member(&self, user_id: i64, workspace_id: i64) -> StoreResult<Option<Member>> {
        Ok(Member::find(&self.pool, user_id, workspace_id).await?)
    }

    async fn list_members(&self, workspace_id: i64) -> StoreResult<Vec<Member>> {
        Ok(Member::list_by_workspace(&self.pool, workspace_id).await?)
    }

    async fn list_memberships_of_user(&self, user_id: i64) -> StoreResult<Vec<Member>> {
        Ok(Member::list_by_user(&self.pool, user_id).await?)
    }

    async fn update_member_role(
        &self,
        user_id: i64,
        workspace_id: i64,
        role: MemberRole,
    ) -> StoreResult<Option<Member>> {
        Ok(Member::update_role(&self.pool, user_id, workspace_id, role).await?)
    }

    async fn delete_member(&self, user_id: i64, workspace_id: i64) -> StoreResult<bool> {
        Ok(Member::delete(&self.pool, user_id, workspace_id).await?)
    }

    async fn create_project_with_columns(&self, data: NewProject) -> StoreResult<(Project, Vec<BoardColumn>)> {
        let mut tx = self.pool.begin().await?;

        let project = Project::create(&mut *tx, data).await?;
        let columns = BoardColumn::insert_defaults(&mut *tx, project.id).await?;

        tx.commit().await?;

        debug!(project_id = project.id, columns = columns.len(), "Project and columns committed");
        Ok((project, columns))
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(&self, workspace_id: i64) -> StoreResult<Vec<Project>> {
        Ok(Project::list_by_workspace(&self.pool, workspace_id).await?)
    }

    async fn update_project(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Option<Project>> {
        Ok(Project::update(&self.pool, id, name, description).await?)
    }

    async fn delete_project(&self, id: i64) -> StoreResult<bool> {
        Ok(Project::delete(&self.pool, id).await?)
    }

    async fn insert_default_columns(&self, project_id: i64) -> StoreResult<Vec<BoardColumn>> {
        let mut tx = self.pool.begin().await?;

        let existing = BoardColumn::list_by_project(&mut *tx, project_id).await?;
        if !existing.is_empty() {
            return Err(StoreError::Conflict(format!(
                "Project {} already has {} columns",
                project_id,
                existing.len()
            )));
        }

        let columns = BoardColumn::insert_defaults(&mut *tx, project_id).await?;
        tx.commit().await?;

        Ok(columns)
    }

    async fn find_column(&self, id: i64) -> StoreResult<Option<BoardColumn>> {
        Ok(BoardColumn::find_by_id(&self.pool, id).await?)
    }

    async fn list_columns(&self, project_id: i64) -> StoreResult<Vec<BoardColumn>> {
        Ok(BoardColumn::list_by_project(&self.pool, project_id).await?)
    }

    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks_by_project(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_project(&self.pool, project_id).await?)
    }

    async fn list_tasks_by_column(&self, column_id: i64) -> StoreResult<Vec<Task>> {
        Ok(Task::list_by_column(&self.pool, column_id).await?)
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, changes).await?)
    }

    async fn set_task_column(
        &self,
        id: i64,
        column_id: i64,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Task>> {
        Ok(Task::set_column(&self.pool, id, column_id, completed_at).await?)
    }

    async fn set_task_assignee(&self, id: i64, assigned_to_id: Option<i64>) -> StoreResult<Option<Task>> {
        Ok(Task::set_assignee(&self.pool, id, assigned_to_id).await?)
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}
