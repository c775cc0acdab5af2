//! Resource lookups gated by the workspace access predicate.
//!
//! Each helper answers 404 for a missing resource before it answers 403 for
//! a caller who neither owns nor belongs to the enclosing workspace.

use teamboard_shared::auth::authorization::require_workspace_access;
use teamboard_shared::auth::bearer::AuthContext;
use teamboard_shared::models::{
    board_column::BoardColumn, project::Project, task::Task, workspace::Workspace,
};

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};

pub(crate) async fn workspace(
    state: &AppState,
    caller: &AuthContext,
    workspace_id: i64,
) -> ApiResult<Workspace> {
    let workspace = state.services.workspaces.get(workspace_id).await?;
    require_workspace_access(state.store.as_ref(), caller.user_id(), &workspace).await?;
    Ok(workspace)
}

pub(crate) async fn project(state: &AppState, caller: &AuthContext, project_id: i64) -> ApiResult<Project> {
    let project = state.services.projects.get(project_id).await?;
    workspace(state, caller, project.workspace_id).await?;
    Ok(project)
}

/// Like [`project`], but the project must also sit in `workspace_id`
pub(crate) async fn project_in(
    state: &AppState,
    caller: &AuthContext,
    workspace_id: i64,
    project_id: i64,
) -> ApiResult<Project> {
    workspace(state, caller, workspace_id).await?;
    let project = state.services.projects.get(project_id).await?;

    if project.workspace_id != workspace_id {
        return Err(ApiError::NotFound(format!(
            "Project {} not found in workspace {}",
            project_id, workspace_id
        )));
    }

    Ok(project)
}

pub(crate) async fn column(state: &AppState, caller: &AuthContext, column_id: i64) -> ApiResult<BoardColumn> {
    let column = state.services.columns.get(column_id).await?;
    project(state, caller, column.project_id).await?;
    Ok(column)
}

pub(crate) async fn task(state: &AppState, caller: &AuthContext, task_id: i64) -> ApiResult<Task> {
    let task = state.services.tasks.get(task_id).await?;
    project(state, caller, task.project_id).await?;
    Ok(task)
}
