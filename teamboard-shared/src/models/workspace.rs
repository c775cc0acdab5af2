/// Workspace model and database operations
///
/// A workspace is the top-level tenant container. It has exactly one owner
/// (the user who created it) and any number of members.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE workspaces (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     description TEXT,
///     owner_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (owner_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// A workspace row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workspace {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Creator of the workspace, immutable
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a workspace
#[derive(Debug, Clone)]
pub struct NewWorkspace {
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i64,
}

const COLUMNS: &str = "id, name, description, owner_id, created_at, updated_at";

impl Workspace {
    /// Inserts a workspace
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the owner already has a workspace
    /// with this name.
    pub async fn create<'e, E>(executor: E, data: NewWorkspace) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workspace>(&format!(
            "INSERT INTO workspaces (name, description, owner_id) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .fetch_one(executor)
        .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workspace>(&format!("SELECT {COLUMNS} FROM workspaces WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_owner_and_name<'e, E>(
        executor: E,
        owner_id: i64,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {COLUMNS} FROM workspaces WHERE owner_id = $1 AND name = $2"
        ))
        .bind(owner_id)
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    /// Lists every workspace, oldest first
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workspace>(&format!("SELECT {COLUMNS} FROM workspaces ORDER BY id"))
            .fetch_all(executor)
            .await
    }

    pub async fn list_by_owner<'e, E>(executor: E, owner_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {COLUMNS} FROM workspaces WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(executor)
        .await
    }

    /// Case-insensitive substring search on the workspace name
    ///
    /// `%` and `_` in the search text are matched literally.
    pub async fn search_by_name<'e, E>(executor: E, text: &str) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let pattern = format!(
            "%{}%",
            text.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );

        sqlx::query_as::<_, Workspace>(&format!(
            "SELECT {COLUMNS} FROM workspaces WHERE name ILIKE $1 ORDER BY id"
        ))
        .bind(pattern)
        .fetch_all(executor)
        .await
    }

    /// Updates name and description, returning `None` if the row is gone
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Workspace>(&format!(
            r#"
            UPDATE workspaces SET name = $2, description = $3, updated_at = NOW()
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

    /// Deletes a workspace; members, projects, columns and tasks cascade
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
