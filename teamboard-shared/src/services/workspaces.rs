/// Workspace lifecycle
///
/// Creation adds the owner as an `ADMIN` member directly through the store,
/// so this service does not depend on [`super::members::MemberService`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::error::{require_non_blank, ServiceError, ServiceResult};
use crate::models::membership::MemberRole;
use crate::models::workspace::{NewWorkspace, Workspace};
use crate::store::Store;

const NAME_REQUIRED: &str = "Workspace name is required";
const DUPLICATE_NAME: &str = "Workspace with this name already exists";

pub struct WorkspaceService {
    store: Arc<dyn Store>,
}

impl WorkspaceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a workspace owned by `owner_id`
    ///
    /// The owner's `ADMIN` membership is added afterwards on a best-effort
    /// basis: a failure there is logged and the workspace is still returned.
    ///
    /// # Errors
    ///
    /// - `Validation` if the name is blank
    /// - `NotFound` if the owner does not exist
    /// - `Conflict` if the owner already has a workspace with this name
    pub async fn create(
        &self,
        name: &str,
        description: Option<String>,
        owner_id: i64,
    ) -> ServiceResult<Workspace> {
        require_non_blank(name, NAME_REQUIRED)?;
        let name = name.trim();

        if self.store.find_user(owner_id).await?.is_none() {
            return Err(ServiceError::not_found("User", owner_id));
        }

        if self
            .store
            .find_workspace_by_owner_and_name(owner_id, name)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(DUPLICATE_NAME.to_string()));
        }

        let workspace = self
            .store
            .create_workspace(NewWorkspace {
                name: name.to_string(),
                description,
                owner_id,
            })
            .await
            .map_err(|e| match ServiceError::from(e) {
                // Lost a race with a concurrent insert of the same name
                ServiceError::Conflict(_) => ServiceError::Conflict(DUPLICATE_NAME.to_string()),
                other => other,
            })?;

        if let Err(e) = self
            .store
            .create_member(owner_id, workspace.id, MemberRole::Admin)
            .await
        {
            warn!(
                workspace_id = workspace.id,
                owner_id,
                error = %e,
                "Could not add owner as workspace admin"
            );
        }

        info!(workspace_id = workspace.id, owner_id, "Workspace created");
        Ok(workspace)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Workspace> {
        self.store
            .find_workspace(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Workspace", id))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Workspace>> {
        Ok(self.store.list_workspaces().await?)
    }

    pub async fn list_by_owner(&self, owner_id: i64) -> ServiceResult<Vec<Workspace>> {
        Ok(self.store.list_workspaces_by_owner(owner_id).await?)
    }

    /// Case-insensitive substring match on the workspace name
    pub async fn search_by_name(&self, text: &str) -> ServiceResult<Vec<Workspace>> {
        Ok(self.store.search_workspaces(text.trim()).await?)
    }

    /// Workspaces the user owns or is a member of, each listed once
    ///
    /// Owned workspaces come first, then the rest of the user's memberships
    /// in membership order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user does not exist
    pub async fn list_accessible_to(&self, user_id: i64) -> ServiceResult<Vec<Workspace>> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(ServiceError::not_found("User", user_id));
        }

        let mut workspaces = self.store.list_workspaces_by_owner(user_id).await?;
        let mut seen: HashSet<i64> = workspaces.iter().map(|w| w.id).collect();

        for membership in self.store.list_memberships_of_user(user_id).await? {
            if !seen.insert(membership.workspace_id) {
                continue;
            }
            // A membership whose workspace vanished mid-listing is skipped
            if let Some(workspace) = self.store.find_workspace(membership.workspace_id).await? {
                workspaces.push(workspace);
            }
        }

        Ok(workspaces)
    }

    /// Renames or re-describes a workspace; owner only
    ///
    /// # Errors
    ///
    /// - `NotFound` if the workspace does not exist
    /// - `Forbidden` if `caller_id` is not the owner
    /// - `Validation` if the name is blank
    /// - `Conflict` if the owner already has another workspace with this name
    pub async fn update(
        &self,
        id: i64,
        caller_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> ServiceResult<Workspace> {
        let workspace = self.get(id).await?;

        if workspace.owner_id != caller_id {
            return Err(ServiceError::Forbidden(
                "Only the workspace owner can update this workspace".to_string(),
            ));
        }
        require_non_blank(name, NAME_REQUIRED)?;

        let updated = self
            .store
            .update_workspace(id, name.trim(), description)
            .await
            .map_err(|e| match ServiceError::from(e) {
                ServiceError::Conflict(_) => ServiceError::Conflict(DUPLICATE_NAME.to_string()),
                other => other,
            })?
            .ok_or_else(|| ServiceError::not_found("Workspace", id))?;

        info!(workspace_id = id, "Workspace updated");
        Ok(updated)
    }

    /// Deletes a workspace and everything in it; owner only
    pub async fn delete(&self, id: i64, caller_id: i64) -> ServiceResult<()> {
        let workspace = self.get(id).await?;

        if workspace.owner_id != caller_id {
            return Err(ServiceError::Forbidden(
                "Only the workspace owner can delete this workspace".to_string(),
            ));
        }

        if !self.store.delete_workspace(id).await? {
            return Err(ServiceError::not_found("Workspace", id));
        }

        info!(workspace_id = id, "Workspace deleted");
        Ok(())
    }
}
