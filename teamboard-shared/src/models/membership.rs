/// Workspace membership model and database operations
///
/// A membership row grants one user access to one workspace with a role.
/// There is at most one row per (user, workspace) pair. The workspace owner
/// is authorized whether or not a row exists for them.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('ADMIN', 'MEMBER', 'VIEWER');
///
/// CREATE TABLE workspace_members (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
///     workspace_id BIGINT NOT NULL REFERENCES workspaces (id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'MEMBER',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, workspace_id)
/// );
/// ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Role of a member inside a workspace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    /// Administers the workspace alongside the owner
    Admin,

    /// Regular contributor
    #[default]
    Member,

    /// Read-only participant
    Viewer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "ADMIN",
            MemberRole::Member => "MEMBER",
            MemberRole::Viewer => "VIEWER",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not one of the known roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid role. Must be one of: ADMIN, MEMBER, VIEWER")]
pub struct InvalidRole;

impl FromStr for MemberRole {
    type Err = InvalidRole;

    /// Parses a role name, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(MemberRole::Admin),
            "MEMBER" => Ok(MemberRole::Member),
            "VIEWER" => Ok(MemberRole::Viewer),
            _ => Err(InvalidRole),
        }
    }
}

/// A membership row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: i64,
    pub user_id: i64,
    pub workspace_id: i64,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, user_id, workspace_id, role, joined_at, updated_at";

impl Member {
    /// Inserts a membership row
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the user is already a member.
    pub async fn create<'e, E>(
        executor: E,
        user_id: i64,
        workspace_id: i64,
        role: MemberRole,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Member>(&format!(
            "INSERT INTO workspace_members (user_id, workspace_id, role) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(user_id)
        .bind(workspace_id)
        .bind(role)
        .fetch_one(executor)
        .await
    }

    pub async fn find<'e, E>(
        executor: E,
        user_id: i64,
        workspace_id: i64,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {COLUMNS} FROM workspace_members WHERE user_id = $1 AND workspace_id = $2"
        ))
        .bind(user_id)
        .bind(workspace_id)
        .fetch_optional(executor)
        .await
    }

    /// Members of a workspace in join order
    pub async fn list_by_workspace<'e, E>(executor: E, workspace_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {COLUMNS} FROM workspace_members WHERE workspace_id = $1 ORDER BY joined_at, id"
        ))
        .bind(workspace_id)
        .fetch_all(executor)
        .await
    }

    /// Memberships held by a user in join order
    pub async fn list_by_user<'e, E>(executor: E, user_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {COLUMNS} FROM workspace_members WHERE user_id = $1 ORDER BY joined_at, id"
        ))
        .bind(user_id)
        .fetch_all(executor)
        .await
    }

    pub async fn update_role<'e, E>(
        executor: E,
        user_id: i64,
        workspace_id: i64,
        role: MemberRole,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE workspace_members SET role = $3, updated_at = NOW()
            WHERE user_id = $1 AND workspace_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(workspace_id)
        .bind(role)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete<'e, E>(executor: E, user_id: i64, workspace_id: i64) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM workspace_members WHERE user_id = $1 AND workspace_id = $2")
            .bind(user_id)
            .bind(workspace_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
