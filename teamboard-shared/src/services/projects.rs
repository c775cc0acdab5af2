/// Project lifecycle
///
/// Access and authorship checks happen in the HTTP layer; this service
/// enforces existence and input rules only.

use std::sync::Arc;

use tracing::info;

use super::error::{require_non_blank, ServiceError, ServiceResult};
use crate::models::board_column::BoardColumn;
use crate::models::project::{NewProject, Project};
use crate::store::Store;

const NAME_REQUIRED: &str = "Project name is required";

pub struct ProjectService {
    store: Arc<dyn Store>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require_workspace(&self, workspace_id: i64) -> ServiceResult<()> {
        if self.store.find_workspace(workspace_id).await?.is_none() {
            return Err(ServiceError::not_found("Workspace", workspace_id));
        }
        Ok(())
    }

    /// Creates a project together with its four board columns
    ///
    /// Both are written in one transaction; if the columns cannot be created
    /// the project does not exist either.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the workspace does not exist
    /// - `Validation` if the name is blank
    pub async fn create(
        &self,
        name: &str,
        description: Option<String>,
        workspace_id: i64,
        creator_id: i64,
    ) -> ServiceResult<(Project, Vec<BoardColumn>)> {
        self.require_workspace(workspace_id).await?;
        require_non_blank(name, NAME_REQUIRED)?;

        let (project, columns) = self
            .store
            .create_project_with_columns(NewProject {
                name: name.trim().to_string(),
                description,
                workspace_id,
                created_by_id: creator_id,
            })
            .await?;

        info!(project_id = project.id, workspace_id, creator_id, "Project created");
        Ok((project, columns))
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Project> {
        self.store
            .find_project(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))
    }

    /// Projects of a workspace, newest first
    pub async fn list_by_workspace(&self, workspace_id: i64) -> ServiceResult<Vec<Project>> {
        self.require_workspace(workspace_id).await?;
        Ok(self.store.list_projects(workspace_id).await?)
    }

    pub async fn update(&self, id: i64, name: &str, description: Option<&str>) -> ServiceResult<Project> {
        require_non_blank(name, NAME_REQUIRED)?;

        let project = self
            .store
            .update_project(id, name.trim(), description)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))?;

        info!(project_id = id, "Project updated");
        Ok(project)
    }

    /// Deletes a project with its columns and tasks
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if !self.store.delete_project(id).await? {
            return Err(ServiceError::not_found("Project", id));
        }

        info!(project_id = id, "Project deleted");
        Ok(())
    }
}
