/// Authorization helpers and permission checks
///
/// # Permission Model
///
/// 1. **Workspace access**: the caller owns the workspace OR holds a
///    membership row in it (any role). Both branches are always evaluated.
/// 2. **Workspace ownership**: only the owner may update or delete the
///    workspace and manage its members.
/// 3. **Project authorship**: only the creator may update or delete a project.
///
/// Projects, columns and tasks are authorized through the workspace they
/// belong to.
///
/// # Example
///
/// ```no_run
/// use teamboard_shared::auth::authorization::{require_project_creator, require_workspace_access};
/// use teamboard_shared::models::{project::Project, workspace::Workspace};
/// use teamboard_shared::store::Store;
///
/// async fn can_edit(
///     store: &dyn Store,
///     caller_id: i64,
///     workspace: &Workspace,
///     project: &Project,
/// ) -> Result<(), Box<dyn std::error::Error>> {
///     require_workspace_access(store, caller_id, workspace).await?;
///     require_project_creator(caller_id, project)?;
///     Ok(())
/// }
/// ```

use crate::models::membership::Member;
use crate::models::project::Project;
use crate::models::workspace::Workspace;
use crate::store::{Store, StoreError};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller neither owns nor is a member of the workspace
    #[error("You are not a member of workspace {0}")]
    NotMember(i64),

    /// Caller is not the workspace owner
    #[error("Only the workspace owner can perform this action")]
    NotOwner,

    /// Caller did not create the project
    #[error("Only the project creator can perform this action")]
    NotCreator,

    /// Membership lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The access predicate: owner OR membership row present
pub fn is_authorized(user_id: i64, workspace: &Workspace, membership: Option<&Member>) -> bool {
    let is_owner = workspace.owner_id == user_id;
    let is_member = membership
        .map(|m| m.user_id == user_id && m.workspace_id == workspace.id)
        .unwrap_or(false);

    is_owner || is_member
}

/// Requires the caller to own or be a member of `workspace`
///
/// # Errors
///
/// Returns `AuthzError::NotMember` when neither holds.
pub async fn require_workspace_access(
    store: &dyn Store,
    user_id: i64,
    workspace: &Workspace,
) -> Result<(), AuthzError> {
    let membership = store.find_member(user_id, workspace.id).await?;

    if !is_authorized(user_id, workspace, membership.as_ref()) {
        return Err(AuthzError::NotMember(workspace.id));
    }

    Ok(())
}

pub fn require_workspace_owner(user_id: i64, workspace: &Workspace) -> Result<(), AuthzError> {
    if workspace.owner_id != user_id {
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}

pub fn require_project_creator(user_id: i64, project: &Project) -> Result<(), AuthzError> {
    if project.created_by_id != user_id {
        return Err(AuthzError::NotCreator);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::MemberRole;
    use chrono::Utc;

    fn workspace(owner_id: i64) -> Workspace {
        Workspace {
            id: 10,
            name: "Acme".to_string(),
            description: None,
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn member(user_id: i64, workspace_id: i64, role: MemberRole) -> Member {
        Member {
            id: 99,
            user_id,
            workspace_id,
            role,
            joined_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_is_authorized_without_membership() {
        assert!(is_authorized(1, &workspace(1), None));
    }

    #[test]
    fn test_member_is_authorized_for_every_role() {
        let ws = workspace(1);
        for role in [MemberRole::Admin, MemberRole::Member, MemberRole::Viewer] {
            assert!(is_authorized(2, &ws, Some(&member(2, ws.id, role))));
        }
    }

    #[test]
    fn test_stranger_is_denied() {
        let ws = workspace(1);
        assert!(!is_authorized(3, &ws, None));
        // A row for another user or workspace grants nothing
        assert!(!is_authorized(3, &ws, Some(&member(4, ws.id, MemberRole::Admin))));
        assert!(!is_authorized(3, &ws, Some(&member(3, ws.id + 1, MemberRole::Admin))));
    }

    #[test]
    fn test_require_workspace_owner() {
        let ws = workspace(1);
        assert!(require_workspace_owner(1, &ws).is_ok());
        assert!(matches!(require_workspace_owner(2, &ws), Err(AuthzError::NotOwner)));
    }

    #[test]
    fn test_authz_error_display() {
        assert!(AuthzError::NotMember(5).to_string().contains("workspace 5"));
        assert!(AuthzError::NotCreator.to_string().contains("project creator"));
    }
}
