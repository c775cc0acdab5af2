/// Workspace membership
///
/// Adding, removing and re-roling members, plus the canonical access
/// predicate for non-HTTP callers.

use std::sync::Arc;

use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::auth::authorization::is_authorized;
use crate::models::membership::{Member, MemberRole};
use crate::models::workspace::Workspace;
use crate::store::Store;

const ALREADY_MEMBER: &str = "User is already a member of this workspace";

pub struct MemberService {
    store: Arc<dyn Store>,
}

impl MemberService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn workspace(&self, workspace_id: i64) -> ServiceResult<Workspace> {
        self.store
            .find_workspace(workspace_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Workspace", workspace_id))
    }

    /// Adds a user to a workspace
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user or workspace does not exist
    /// - `Conflict` if the user already has a membership row
    pub async fn add_member(&self, user_id: i64, workspace_id: i64, role: MemberRole) -> ServiceResult<Member> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(ServiceError::not_found("User", user_id));
        }
        self.workspace(workspace_id).await?;

        if self.store.find_member(user_id, workspace_id).await?.is_some() {
            return Err(ServiceError::Conflict(ALREADY_MEMBER.to_string()));
        }

        let member = self
            .store
            .create_member(user_id, workspace_id, role)
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::Conflict(_) => ServiceError::Conflict(ALREADY_MEMBER.to_string()),
                other => other,
            })?;

        info!(user_id, workspace_id, role = %role, "Member added");
        Ok(member)
    }

    /// Removes a user's membership row
    ///
    /// The owner check runs before the row lookup, so removing the owner
    /// always fails with `CannotRemoveOwner`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the workspace or the membership row does not exist
    /// - `CannotRemoveOwner` if `user_id` owns the workspace
    pub async fn remove_member(&self, user_id: i64, workspace_id: i64) -> ServiceResult<()> {
        let workspace = self.workspace(workspace_id).await?;

        if workspace.owner_id == user_id {
            return Err(ServiceError::CannotRemoveOwner);
        }

        if !self.store.delete_member(user_id, workspace_id).await? {
            return Err(ServiceError::NotFound(format!(
                "User {} is not a member of workspace {}",
                user_id, workspace_id
            )));
        }

        info!(user_id, workspace_id, "Member removed");
        Ok(())
    }

    /// Changes a member's role
    ///
    /// # Errors
    ///
    /// `NotFound` if the user has no membership row in the workspace
    pub async fn update_role(&self, user_id: i64, workspace_id: i64, role: MemberRole) -> ServiceResult<Member> {
        let member = self
            .store
            .update_member_role(user_id, workspace_id, role)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "User {} is not a member of workspace {}",
                    user_id, workspace_id
                ))
            })?;

        info!(user_id, workspace_id, role = %role, "Member role updated");
        Ok(member)
    }

    /// Pure lookup; absence is not an error
    pub async fn get_member(&self, user_id: i64, workspace_id: i64) -> ServiceResult<Option<Member>> {
        Ok(self.store.find_member(user_id, workspace_id).await?)
    }

    /// Members of a workspace
    ///
    /// # Errors
    ///
    /// `NotFound` if the workspace does not exist
    pub async fn list_members(&self, workspace_id: i64) -> ServiceResult<Vec<Member>> {
        self.workspace(workspace_id).await?;
        Ok(self.store.list_members(workspace_id).await?)
    }

    /// Memberships held by a user
    ///
    /// # Errors
    ///
    /// `NotFound` if the user does not exist
    pub async fn list_memberships_of_user(&self, user_id: i64) -> ServiceResult<Vec<Member>> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(ServiceError::not_found("User", user_id));
        }
        Ok(self.store.list_memberships_of_user(user_id).await?)
    }

    /// Owner OR member of `workspace`
    pub async fn is_authorized(&self, user_id: i64, workspace: &Workspace) -> ServiceResult<bool> {
        let membership = self.store.find_member(user_id, workspace.id).await?;
        Ok(is_authorized(user_id, workspace, membership.as_ref()))
    }
}
