/// Workspace member endpoints
///
/// Listing requires workspace access; adding, re-roling and removing members
/// is reserved for the owner.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    routes::{access, views, views::MemberView},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use teamboard_shared::auth::authorization::require_workspace_owner;
use teamboard_shared::auth::bearer::AuthContext;
use teamboard_shared::models::membership::MemberRole;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: i64,
    /// `ADMIN`, `MEMBER` or `VIEWER`; defaults to `MEMBER`
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

fn parse_role(raw: Option<&str>) -> ApiResult<MemberRole> {
    match raw {
        None => Ok(MemberRole::default()),
        Some(raw) => raw
            .parse::<MemberRole>()
            .map_err(|e| ApiError::BadRequest(e.to_string())),
    }
}

async fn owned_workspace(state: &AppState, auth: &AuthContext, workspace_id: i64) -> ApiResult<()> {
    let workspace = state.services.workspaces.get(workspace_id).await?;
    require_workspace_owner(auth.user_id(), &workspace)?;
    Ok(())
}

pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(workspace_id): Path<i64>,
) -> ApiResult<Json<Vec<MemberView>>> {
    access::workspace(&state, &auth, workspace_id).await?;

    let members = state.services.members.list_members(workspace_id).await?;
    Ok(Json(views::members(&state, members).await?))
}

/// Add a user to the workspace
///
/// # Errors
///
/// - `400 Bad Request`: Unknown role
/// - `403 Forbidden`: Caller is not the owner
/// - `404 Not Found`: Unknown workspace or user
/// - `409 Conflict`: Already a member
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(workspace_id): Path<i64>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberView>)> {
    owned_workspace(&state, &auth, workspace_id).await?;
    let role = parse_role(req.role.as_deref())?;

    let member = state
        .services
        .members
        .add_member(req.user_id, workspace_id, role)
        .await?;

    Ok((StatusCode::CREATED, Json(views::member(&state, member).await?)))
}

pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((workspace_id, user_id)): Path<(i64, i64)>,
    ApiJson(req): ApiJson<UpdateRoleRequest>,
) -> ApiResult<Json<MemberView>> {
    owned_workspace(&state, &auth, workspace_id).await?;
    let role = parse_role(Some(&req.role))?;

    let member = state
        .services
        .members
        .update_role(user_id, workspace_id, role)
        .await?;

    Ok(Json(views::member(&state, member).await?))
}

/// Remove a member; the owner can never be removed
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((workspace_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    owned_workspace(&state, &auth, workspace_id).await?;

    state.services.members.remove_member(user_id, workspace_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(None).unwrap(), MemberRole::Member);
        assert_eq!(parse_role(Some("viewer")).unwrap(), MemberRole::Viewer);
        assert_eq!(parse_role(Some(" ADMIN ")).unwrap(), MemberRole::Admin);
        assert!(matches!(parse_role(Some("OWNER")), Err(ApiError::BadRequest(_))));
    }
}
