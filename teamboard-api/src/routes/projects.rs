/// Project endpoints, nested under their workspace
///
/// Reading and creating need workspace access; changing or deleting a
/// project is reserved for its creator. A project addressed through a
/// workspace it does not belong to is 404.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    routes::{access, views, views::ProjectView},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamboard_shared::auth::authorization::require_project_creator;
use teamboard_shared::auth::bearer::AuthContext;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ProjectRequest {
    #[validate(length(max = 100, message = "Project name must be at most 100 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(workspace_id): Path<i64>,
) -> ApiResult<Json<Vec<ProjectView>>> {
    access::workspace(&state, &auth, workspace_id).await?;

    let projects = state.services.projects.list_by_workspace(workspace_id).await?;
    Ok(Json(views::projects(&state, projects).await?))
}

/// Create a project together with its four board columns
///
/// # Errors
///
/// - `400 Bad Request`: Blank or oversized name
/// - `403 Forbidden`: Caller has no access to the workspace
/// - `404 Not Found`: Unknown workspace
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(workspace_id): Path<i64>,
    ApiJson(req): ApiJson<ProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectView>)> {
    access::workspace(&state, &auth, workspace_id).await?;
    req.validate()?;

    let (project, _columns) = state
        .services
        .projects
        .create(&req.name, req.description, workspace_id, auth.user_id())
        .await?;

    Ok((StatusCode::CREATED, Json(views::project(&state, project).await?)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((workspace_id, project_id)): Path<(i64, i64)>,
) -> ApiResult<Json<ProjectView>> {
    let project = access::project_in(&state, &auth, workspace_id, project_id).await?;
    Ok(Json(views::project(&state, project).await?))
}

/// Rename or re-describe a project (creator only)
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((workspace_id, project_id)): Path<(i64, i64)>,
    ApiJson(req): ApiJson<ProjectRequest>,
) -> ApiResult<Json<ProjectView>> {
    let project = access::project_in(&state, &auth, workspace_id, project_id).await?;
    require_project_creator(auth.user_id(), &project)?;
    req.validate()?;

    let project = state
        .services
        .projects
        .update(project_id, &req.name, req.description.as_deref())
        .await?;

    Ok(Json(views::project(&state, project).await?))
}

/// Delete a project with its columns and tasks (creator only)
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((workspace_id, project_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    let project = access::project_in(&state, &auth, workspace_id, project_id).await?;
    require_project_creator(auth.user_id(), &project)?;

    state.services.projects.delete(project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
