/// Project model and database operations
///
/// A project lives in exactly one workspace and is mutable only by the user
/// who created it. Its board columns are created in the same transaction as
/// the project row (see [`crate::store::Store::create_project_with_columns`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// A project row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Owning workspace, immutable
    pub workspace_id: i64,
    /// Creator, immutable; the only user allowed to update or delete
    pub created_by_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub workspace_id: i64,
    pub created_by_id: i64,
}

const COLUMNS: &str = "id, name, description, workspace_id, created_by_id, created_at, updated_at";

impl Project {
    pub async fn create<'e, E>(executor: E, data: NewProject) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            INSERT INTO projects (name, description, workspace_id, created_by_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.workspace_id)
        .bind(data.created_by_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(&format!("SELECT {COLUMNS} FROM projects WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Projects of a workspace, newest first
    pub async fn list_by_workspace<'e, E>(executor: E, workspace_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {COLUMNS} FROM projects WHERE workspace_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(workspace_id)
        .fetch_all(executor)
        .await
    }

    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects SET name = $2, description = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(executor)
        .await
    }

    /// Deletes a project; its columns and tasks cascade
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
