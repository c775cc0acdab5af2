/// Workspace endpoints
///
/// - `GET /api/workspaces` - Workspaces the caller owns or belongs to
/// - `POST /api/workspaces` - Create a workspace owned by the caller
/// - `GET /api/workspaces/search?name=..` - Case-insensitive name search
/// - `GET /api/workspaces/owner/:owner_id` - Workspaces of one owner
/// - `GET/PUT/DELETE /api/workspaces/:id` - Read (members) or change (owner)
///
/// Search and by-owner listings only return workspaces the caller can access.

use std::collections::HashSet;

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ApiJson,
    routes::{access, views, views::WorkspaceView},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamboard_shared::auth::authorization::require_workspace_owner;
use teamboard_shared::auth::bearer::AuthContext;
use teamboard_shared::models::workspace::Workspace;
use validator::Validate;

/// Create or update request
#[derive(Debug, Deserialize, Validate)]
pub struct WorkspaceRequest {
    #[validate(length(min = 1, max = 100, message = "Workspace name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

/// Keeps the rows the caller may see
async fn visible_to(state: &AppState, caller: &AuthContext, rows: Vec<Workspace>) -> ApiResult<Vec<Workspace>> {
    let accessible: HashSet<i64> = state
        .services
        .workspaces
        .list_accessible_to(caller.user_id())
        .await?
        .into_iter()
        .map(|w| w.id)
        .collect();

    Ok(rows.into_iter().filter(|w| accessible.contains(&w.id)).collect())
}

pub async fn list_workspaces(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<WorkspaceView>>> {
    let rows = state.services.workspaces.list_accessible_to(auth.user_id()).await?;
    Ok(Json(views::workspaces(&state, rows).await?))
}

/// Create a workspace
///
/// # Errors
///
/// - `400 Bad Request`: Blank or oversized name
/// - `409 Conflict`: The caller already owns a workspace with this name
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<WorkspaceRequest>,
) -> ApiResult<(StatusCode, Json<WorkspaceView>)> {
    req.validate()?;

    let workspace = state
        .services
        .workspaces
        .create(&req.name, req.description, auth.user_id())
        .await?;

    Ok((StatusCode::CREATED, Json(views::workspace(&state, workspace).await?)))
}

pub async fn search_workspaces(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<WorkspaceView>>> {
    let rows = state.services.workspaces.search_by_name(&query.name).await?;
    let rows = visible_to(&state, &auth, rows).await?;
    Ok(Json(views::workspaces(&state, rows).await?))
}

pub async fn list_workspaces_by_owner(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(owner_id): Path<i64>,
) -> ApiResult<Json<Vec<WorkspaceView>>> {
    let rows = state.services.workspaces.list_by_owner(owner_id).await?;
    let rows = visible_to(&state, &auth, rows).await?;
    Ok(Json(views::workspaces(&state, rows).await?))
}

pub async fn get_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<WorkspaceView>> {
    let workspace = access::workspace(&state, &auth, id).await?;
    Ok(Json(views::workspace(&state, workspace).await?))
}

/// Rename or re-describe a workspace (owner only)
pub async fn update_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    ApiJson(req): ApiJson<WorkspaceRequest>,
) -> ApiResult<Json<WorkspaceView>> {
    // Unknown id and non-owner callers are reported before body problems
    let existing = state.services.workspaces.get(id).await?;
    require_workspace_owner(auth.user_id(), &existing)?;
    req.validate()?;

    let workspace = state
        .services
        .workspaces
        .update(id, auth.user_id(), &req.name, req.description.as_deref())
        .await?;

    Ok(Json(views::workspace(&state, workspace).await?))
}

/// Delete a workspace with all its members, projects and tasks (owner only)
pub async fn delete_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.services.workspaces.delete(id, auth.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
