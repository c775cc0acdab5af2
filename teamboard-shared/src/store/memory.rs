//! In-memory store.
//!
//! Mirrors the schema's unique indexes and cascades so services behave the
//! same as on PostgreSQL. All tables sit behind one async mutex, which makes
//! every operation (including project + column creation) atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{Store, StoreError, StoreResult};
use crate::models::board_column::{BoardColumn, DEFAULT_COLUMNS};
use crate::models::membership::{Member, MemberRole};
use crate::models::project::{NewProject, Project};
use crate::models::task::{NewTask, Task, TaskChanges};
use crate::models::user::{NewUser, User};
use crate::models::workspace::{NewWorkspace, Workspace};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    workspaces: BTreeMap<i64, Workspace>,
    members: BTreeMap<i64, Member>,
    projects: BTreeMap<i64, Project>,
    columns: BTreeMap<i64, BoardColumn>,
    tasks: BTreeMap<i64, Task>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn default_columns(&mut self, project_id: i64) -> Vec<BoardColumn> {
        let now = Utc::now();
        let mut created = Vec::with_capacity(DEFAULT_COLUMNS.len());

        for name in DEFAULT_COLUMNS {
            let column = BoardColumn {
                id: self.next_id(),
                name,
                position: name.position(),
                project_id,
                created_at: now,
            };
            self.columns.insert(column.id, column.clone());
            created.push(column);
        }

        created
    }

    fn remove_project(&mut self, project_id: i64) {
        self.tasks.retain(|_, t| t.project_id != project_id);
        self.columns.retain(|_, c| c.project_id != project_id);
        self.projects.remove(&project_id);
    }
}

/// Newest first, ties broken by ID
fn newest_first(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    tasks
}

/// [`Store`] implementation backed by in-process maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        let mut t = self.tables.lock().await;

        if t.users.values().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict(format!("email {} already exists", data.email)));
        }

        let now = Utc::now();
        let user = User {
            id: t.next_id(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            avatar_initials: data.avatar_initials,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[i64]) -> StoreResult<Vec<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.values().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn update_user(&self, user: &User) -> StoreResult<Option<User>> {
        let mut t = self.tables.lock().await;

        if t.users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::Conflict(format!("email {} already exists", user.email)));
        }

        let Some(existing) = t.users.get_mut(&user.id) else {
            return Ok(None);
        };
        existing.name = user.name.clone();
        existing.email = user.email.clone();
        existing.password_hash = user.password_hash.clone();
        existing.avatar_initials = user.avatar_initials.clone();
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn create_workspace(&self, data: NewWorkspace) -> StoreResult<Workspace> {
        let mut t = self.tables.lock().await;

        if t
            .workspaces
            .values()
            .any(|w| w.owner_id == data.owner_id && w.name == data.name)
        {
            return Err(StoreError::Conflict(format!(
                "workspace {} already exists for owner {}",
                data.name, data.owner_id
            )));
        }

        let now = Utc::now();
        let workspace = Workspace {
            id: t.next_id(),
            name: data.name,
            description: data.description,
            owner_id: data.owner_id,
            created_at: now,
            updated_at: now,
        };
        t.workspaces.insert(workspace.id, workspace.clone());
        Ok(workspace)
    }

    async fn find_workspace(&self, id: i64) -> StoreResult<Option<Workspace>> {
        Ok(self.tables.lock().await.workspaces.get(&id).cloned())
    }

    async fn find_workspace_by_owner_and_name(
        &self,
        owner_id: i64,
        name: &str,
    ) -> StoreResult<Option<Workspace>> {
        let t = self.tables.lock().await;
        Ok(t
            .workspaces
            .values()
            .find(|w| w.owner_id == owner_id && w.name == name)
            .cloned())
    }

    async fn list_workspaces(&self) -> StoreResult<Vec<Workspace>> {
        Ok(self.tables.lock().await.workspaces.values().cloned().collect())
    }

    async fn list_workspaces_by_owner(&self, owner_id: i64) -> StoreResult<Vec<Workspace>> {
        let t = self.tables.lock().await;
        Ok(t.workspaces.values().filter(|w| w.owner_id == owner_id).cloned().collect())
    }

    async fn search_workspaces(&self, text: &str) -> StoreResult<Vec<Workspace>> {
        let needle = text.to_lowercase();
        let t = self.tables.lock().await;
        Ok(t
            .workspaces
            .values()
            .filter(|w| w.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn update_workspace(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Option<Workspace>> {
        let mut t = self.tables.lock().await;

        let Some(owner_id) = t.workspaces.get(&id).map(|w| w.owner_id) else {
            return Ok(None);
        };
        if t
            .workspaces
            .values()
            .any(|w| w.id != id && w.owner_id == owner_id && w.name == name)
        {
            return Err(StoreError::Conflict(format!(
                "workspace {} already exists for owner {}",
                name, owner_id
            )));
        }

        let Some(workspace) = t.workspaces.get_mut(&id) else {
            return Ok(None);
        };
        workspace.name = name.to_string();
        workspace.description = description.map(str::to_string);
        workspace.updated_at = Utc::now();
        Ok(Some(workspace.clone()))
    }

    async fn delete_workspace(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.lock().await;

        if t.workspaces.remove(&id).is_none() {
            return Ok(false);
        }

        t.members.retain(|_, m| m.workspace_id != id);
        let project_ids: Vec<i64> = t
            .projects
            .values()
            .filter(|p| p.workspace_id == id)
            .map(|p| p.id)
            .collect();
        for project_id in project_ids {
            t.remove_project(project_id);
        }

        Ok(true)
    }

    async fn create_member(&self, user_id: i64, workspace_id: i64, role: MemberRole) -> StoreResult<Member> {
        let mut t = self.tables.lock().await;

        if t
            .members
            .values()
            .any(|m| m.user_id == user_id && m.workspace_id == workspace_id)
        {
            return Err(StoreError::Conflict(format!(
                "user {} is already a member of workspace {}",
                user_id, workspace_id
            )));
        }

        let now = Utc::now();
        let member = Member {
            id: t.next_id(),
            user_id,
            workspace_id,
            role,
            joined_at: now,
            updated_at: now,
        };
        t.members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn find_member(&self, user_id: i64, workspace_id: i64) -> StoreResult<Option<Member>> {
        let t = self.tables.lock().await;
        Ok(t
            .members
            .values()
            .find(|m| m.user_id == user_id && m.workspace_id == workspace_id)
            .cloned())
    }

    async fn list_members(&self, workspace_id: i64) -> StoreResult<Vec<Member>> {
        let t = self.tables.lock().await;
        Ok(t.members.values().filter(|m| m.workspace_id == workspace_id).cloned().collect())
    }

    async fn list_memberships_of_user(&self, user_id: i64) -> StoreResult<Vec<Member>> {
        let t = self.tables.lock().await;
        Ok(t.members.values().filter(|m| m.user_id == user_id).cloned().collect())
    }

    async fn update_member_role(
        &self,
        user_id: i64,
        workspace_id: i64,
        role: MemberRole,
    ) -> StoreResult<Option<Member>> {
        let mut t = self.tables.lock().await;
        Ok(t
            .members
            .values_mut()
            .find(|m| m.user_id == user_id && m.workspace_id == workspace_id)
            .map(|m| {
                m.role = role;
                m.updated_at = Utc::now();
                m.clone()
            }))
    }

    async fn delete_member(&self, user_id: i64, workspace_id: i64) -> StoreResult<bool> {
        let mut t = self.tables.lock().await;
        let before = t.members.len();
        t.members
            .retain(|_, m| !(m.user_id == user_id && m.workspace_id == workspace_id));
        Ok(t.members.len() < before)
    }

    async fn create_project_with_columns(&self, data: NewProject) -> StoreResult<(Project, Vec<BoardColumn>)> {
        let mut t = self.tables.lock().await;

        let now = Utc::now();
        let project = Project {
            id: t.next_id(),
            name: data.name,
            description: data.description,
            workspace_id: data.workspace_id,
            created_by_id: data.created_by_id,
            created_at: now,
            updated_at: now,
        };
        t.projects.insert(project.id, project.clone());
        let columns = t.default_columns(project.id);

        Ok((project, columns))
    }

    async fn find_project(&self, id: i64) -> StoreResult<Option<Project>> {
        Ok(self.tables.lock().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self, workspace_id: i64) -> StoreResult<Vec<Project>> {
        let t = self.tables.lock().await;
        let mut projects: Vec<Project> = t
            .projects
            .values()
            .filter(|p| p.workspace_id == workspace_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn update_project(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> StoreResult<Option<Project>> {
        let mut t = self.tables.lock().await;
        Ok(t.projects.get_mut(&id).map(|p| {
            p.name = name.to_string();
            p.description = description.map(str::to_string);
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete_project(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.lock().await;
        if !t.projects.contains_key(&id) {
            return Ok(false);
        }
        t.remove_project(id);
        Ok(true)
    }

    async fn insert_default_columns(&self, project_id: i64) -> StoreResult<Vec<BoardColumn>> {
        let mut t = self.tables.lock().await;

        let existing = t.columns.values().filter(|c| c.project_id == project_id).count();
        if existing > 0 {
            return Err(StoreError::Conflict(format!(
                "Project {} already has {} columns",
                project_id, existing
            )));
        }

        Ok(t.default_columns(project_id))
    }

    async fn find_column(&self, id: i64) -> StoreResult<Option<BoardColumn>> {
        Ok(self.tables.lock().await.columns.get(&id).cloned())
    }

    async fn list_columns(&self, project_id: i64) -> StoreResult<Vec<BoardColumn>> {
        let t = self.tables.lock().await;
        let mut columns: Vec<BoardColumn> = t
            .columns
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect();
        columns.sort_by_key(|c| (c.position, c.id));
        Ok(columns)
    }

    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        let mut t = self.tables.lock().await;

        let now = Utc::now();
        let task = Task {
            id: t.next_id(),
            title: data.title,
            description: data.description,
            project_id: data.project_id,
            column_id: data.column_id,
            assigned_to_id: data.assigned_to_id,
            priority: data.priority,
            due_date: data.due_date,
            created_by_id: data.created_by_id,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        t.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(self.tables.lock().await.tasks.get(&id).cloned())
    }

    async fn list_tasks_by_project(&self, project_id: i64) -> StoreResult<Vec<Task>> {
        let t = self.tables.lock().await;
        Ok(newest_first(
            t.tasks.values().filter(|task| task.project_id == project_id).cloned().collect(),
        ))
    }

    async fn list_tasks_by_column(&self, column_id: i64) -> StoreResult<Vec<Task>> {
        let t = self.tables.lock().await;
        Ok(newest_first(
            t.tasks.values().filter(|task| task.column_id == column_id).cloned().collect(),
        ))
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<Option<Task>> {
        let mut t = self.tables.lock().await;
        Ok(t.tasks.get_mut(&id).map(|task| {
            task.title = changes.title;
            task.description = changes.description;
            task.priority = changes.priority;
            task.due_date = changes.due_date;
            task.assigned_to_id = changes.assigned_to_id;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn set_task_column(
        &self,
        id: i64,
        column_id: i64,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Option<Task>> {
        let mut t = self.tables.lock().await;
        Ok(t.tasks.get_mut(&id).map(|task| {
            task.column_id = column_id;
            task.completed_at = completed_at;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn set_task_assignee(&self, id: i64, assigned_to_id: Option<i64>) -> StoreResult<Option<Task>> {
        let mut t = self.tables.lock().await;
        Ok(t.tasks.get_mut(&id).map(|task| {
            task.assigned_to_id = assigned_to_id;
            task.updated_at = Utc::now();
            task.clone()
        }))
    }

    async fn delete_task(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.lock().await.tasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::board_column::ColumnName;

    async fn seed_project(store: &MemoryStore) -> (User, Workspace, Project) {
        let user = store
            .create_user(NewUser {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: "hash".to_string(),
                avatar_initials: None,
            })
            .await
            .unwrap();
        let workspace = store
            .create_workspace(NewWorkspace {
                name: "Acme".to_string(),
                description: None,
                owner_id: user.id,
            })
            .await
            .unwrap();
        let (project, _) = store
            .create_project_with_columns(NewProject {
                name: "Launch".to_string(),
                description: None,
                workspace_id: workspace.id,
                created_by_id: user.id,
            })
            .await
            .unwrap();
        (user, workspace, project)
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        seed_project(&store).await;

        let err = store
            .create_user(NewUser {
                name: "Other".to_string(),
                email: "owner@example.com".to_string(),
                password_hash: "hash".to_string(),
                avatar_initials: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_project_gets_four_ordered_columns() {
        let store = MemoryStore::new();
        let (_, _, project) = seed_project(&store).await;

        let columns = store.list_columns(project.id).await.unwrap();
        let names: Vec<ColumnName> = columns.iter().map(|c| c.name).collect();
        assert_eq!(names, DEFAULT_COLUMNS.to_vec());
        assert_eq!(columns.iter().map(|c| c.position).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_second_column_bootstrap_is_conflict() {
        let store = MemoryStore::new();
        let (_, _, project) = seed_project(&store).await;

        let err = store.insert_default_columns(project.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list_columns(project.id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_workspace_delete_cascades() {
        let store = MemoryStore::new();
        let (user, workspace, project) = seed_project(&store).await;
        store.create_member(user.id, workspace.id, MemberRole::Admin).await.unwrap();
        let backlog = store.list_columns(project.id).await.unwrap()[0].clone();
        let task = store
            .create_task(NewTask {
                title: "Ship it".to_string(),
                description: None,
                project_id: project.id,
                column_id: backlog.id,
                assigned_to_id: None,
                priority: Default::default(),
                due_date: None,
                created_by_id: user.id,
            })
            .await
            .unwrap();

        assert!(store.delete_workspace(workspace.id).await.unwrap());

        assert!(store.find_project(project.id).await.unwrap().is_none());
        assert!(store.find_column(backlog.id).await.unwrap().is_none());
        assert!(store.find_task(task.id).await.unwrap().is_none());
        assert!(store.find_member(user.id, workspace.id).await.unwrap().is_none());
        assert!(store.find_user(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_memberships_of_user() {
        let store = MemoryStore::new();
        let (user, workspace, _) = seed_project(&store).await;
        store.create_member(user.id, workspace.id, MemberRole::Admin).await.unwrap();

        let memberships = store.list_memberships_of_user(user.id).await.unwrap();
        assert_eq!(memberships.len(), 1);
        assert_eq!(memberships[0].workspace_id, workspace.id);
        assert!(store.list_memberships_of_user(user.id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = MemoryStore::new();
        seed_project(&store).await;

        assert_eq!(store.search_workspaces("cm").await.unwrap().len(), 1);
        assert_eq!(store.search_workspaces("ACME").await.unwrap().len(), 1);
        assert!(store.search_workspaces("zeta").await.unwrap().is_empty());
    }
}
