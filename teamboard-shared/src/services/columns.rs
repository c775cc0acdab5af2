//! Board column bootstrap and lookup.

use std::sync::Arc;

use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::models::board_column::{BoardColumn, ColumnName};
use crate::store::{Store, StoreError};

pub struct ColumnService {
    store: Arc<dyn Store>,
}

impl ColumnService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require_project(&self, project_id: i64) -> ServiceResult<()> {
        if self.store.find_project(project_id).await?.is_none() {
            return Err(ServiceError::not_found("Project", project_id));
        }
        Ok(())
    }

    /// Creates `BACKLOG`, `TO_DO`, `IN_PROGRESS` and `DONE` at positions 1-4
    ///
    /// Project creation already does this; calling it for a project that has
    /// columns is refused rather than producing duplicates.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project does not exist
    /// - `Conflict` if the project already has columns
    pub async fn create_default_columns(&self, project_id: i64) -> ServiceResult<Vec<BoardColumn>> {
        self.require_project(project_id).await?;

        let columns = self
            .store
            .insert_default_columns(project_id)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => {
                    ServiceError::Conflict("Project already has board columns".to_string())
                }
                other => other.into(),
            })?;

        info!(project_id, "Default columns created");
        Ok(columns)
    }

    /// Columns of a project ordered by position
    pub async fn list_by_project(&self, project_id: i64) -> ServiceResult<Vec<BoardColumn>> {
        self.require_project(project_id).await?;
        Ok(self.store.list_columns(project_id).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<BoardColumn> {
        self.store
            .find_column(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Column", id))
    }

    /// The project's column with the given name
    pub async fn find_by_name(&self, project_id: i64, name: ColumnName) -> ServiceResult<Option<BoardColumn>> {
        let columns = self.store.list_columns(project_id).await?;
        Ok(columns.into_iter().find(|c| c.name == name))
    }
}
