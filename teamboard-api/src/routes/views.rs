/// JSON response projections
///
/// Every view is camelCase and never carries a password hash. Views that
/// show user names take a map built by `UserService::lookup`, so a list of
/// N rows costs one user query.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use teamboard_shared::models::{
    board_column::{BoardColumn, ColumnName},
    membership::{Member, MemberRole},
    project::Project,
    task::{Priority, Task},
    user::User,
    workspace::Workspace,
};

use crate::app::AppState;
use crate::error::ApiResult;

type Users = HashMap<i64, User>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar_initials: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_initials: user.avatar_initials,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkspaceView {
    fn new(workspace: Workspace, users: &Users) -> Self {
        let owner = users.get(&workspace.owner_id);
        Self {
            id: workspace.id,
            name: workspace.name,
            description: workspace.description,
            owner_id: workspace.owner_id,
            owner_name: owner.map(|u| u.name.clone()),
            owner_email: owner.map(|u| u.email.clone()),
            created_at: workspace.created_at,
            updated_at: workspace.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: i64,
    pub user_id: i64,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MemberView {
    fn new(member: Member, users: &Users) -> Self {
        let user = users.get(&member.user_id);
        Self {
            id: member.id,
            user_id: member.user_id,
            user_email: user.map(|u| u.email.clone()),
            user_name: user.map(|u| u.name.clone()),
            role: member.role,
            joined_at: member.joined_at,
            updated_at: member.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: i64,
    pub created_by_id: i64,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectView {
    fn new(project: Project, users: &Users) -> Self {
        Self {
            created_by_name: users.get(&project.created_by_id).map(|u| u.name.clone()),
            id: project.id,
            name: project.name,
            description: project.description,
            workspace_id: project.workspace_id,
            created_by_id: project.created_by_id,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnView {
    pub id: i64,
    pub name: ColumnName,
    pub position: i32,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
}

impl From<BoardColumn> for ColumnView {
    fn from(column: BoardColumn) -> Self {
        Self {
            id: column.id,
            name: column.name,
            position: column.position,
            project_id: column.project_id,
            created_at: column.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub project_id: i64,
    pub column_id: i64,
    pub assigned_to_id: Option<i64>,
    pub assigned_to_name: Option<String>,
    pub assigned_to_initials: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub created_by_id: i64,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskView {
    fn new(task: Task, users: &Users) -> Self {
        let assignee = task.assigned_to_id.and_then(|id| users.get(&id));
        Self {
            assigned_to_name: assignee.map(|u| u.name.clone()),
            assigned_to_initials: assignee.and_then(|u| u.avatar_initials.clone()),
            created_by_name: users.get(&task.created_by_id).map(|u| u.name.clone()),
            id: task.id,
            title: task.title,
            description: task.description,
            project_id: task.project_id,
            column_id: task.column_id,
            assigned_to_id: task.assigned_to_id,
            priority: task.priority,
            due_date: task.due_date,
            created_by_id: task.created_by_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
            completed_at: task.completed_at,
        }
    }
}

pub async fn workspaces(state: &AppState, rows: Vec<Workspace>) -> ApiResult<Vec<WorkspaceView>> {
    let ids: Vec<i64> = rows.iter().map(|w| w.owner_id).collect();
    let users = state.services.users.lookup(&ids).await?;
    Ok(rows.into_iter().map(|w| WorkspaceView::new(w, &users)).collect())
}

pub async fn workspace(state: &AppState, row: Workspace) -> ApiResult<WorkspaceView> {
    let users = state.services.users.lookup(&[row.owner_id]).await?;
    Ok(WorkspaceView::new(row, &users))
}

pub async fn members(state: &AppState, rows: Vec<Member>) -> ApiResult<Vec<MemberView>> {
    let ids: Vec<i64> = rows.iter().map(|m| m.user_id).collect();
    let users = state.services.users.lookup(&ids).await?;
    Ok(rows.into_iter().map(|m| MemberView::new(m, &users)).collect())
}

pub async fn member(state: &AppState, row: Member) -> ApiResult<MemberView> {
    let users = state.services.users.lookup(&[row.user_id]).await?;
    Ok(MemberView::new(row, &users))
}

pub async fn projects(state: &AppState, rows: Vec<Project>) -> ApiResult<Vec<ProjectView>> {
    let ids: Vec<i64> = rows.iter().map(|p| p.created_by_id).collect();
    let users = state.services.users.lookup(&ids).await?;
    Ok(rows.into_iter().map(|p| ProjectView::new(p, &users)).collect())
}

pub async fn project(state: &AppState, row: Project) -> ApiResult<ProjectView> {
    let users = state.services.users.lookup(&[row.created_by_id]).await?;
    Ok(ProjectView::new(row, &users))
}

pub fn columns(rows: Vec<BoardColumn>) -> Vec<ColumnView> {
    rows.into_iter().map(ColumnView::from).collect()
}

pub async fn tasks(state: &AppState, rows: Vec<Task>) -> ApiResult<Vec<TaskView>> {
    let ids: Vec<i64> = rows
        .iter()
        .flat_map(|t| std::iter::once(t.created_by_id).chain(t.assigned_to_id))
        .collect();
    let users = state.services.users.lookup(&ids).await?;
    Ok(rows.into_iter().map(|t| TaskView::new(t, &users)).collect())
}

pub async fn task(state: &AppState, row: Task) -> ApiResult<TaskView> {
    let ids: Vec<i64> = std::iter::once(row.created_by_id).chain(row.assigned_to_id).collect();
    let users = state.services.users.lookup(&ids).await?;
    Ok(TaskView::new(row, &users))
}
