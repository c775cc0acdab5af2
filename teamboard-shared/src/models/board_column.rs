/// Board column model and database operations
///
/// Every project has exactly four columns, created together with the
/// project and never individually:
///
/// | position | name          |
/// |----------|---------------|
/// | 1        | `BACKLOG`     |
/// | 2        | `TO_DO`       |
/// | 3        | `IN_PROGRESS` |
/// | 4        | `DONE`        |
///
/// # Schema
///
/// ```sql
/// CREATE TYPE column_name AS ENUM ('BACKLOG', 'TO_DO', 'IN_PROGRESS', 'DONE');
///
/// CREATE TABLE board_columns (
///     id BIGSERIAL PRIMARY KEY,
///     name column_name NOT NULL,
///     position INTEGER NOT NULL,
///     project_id BIGINT NOT NULL REFERENCES projects (id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};

/// Name of a board column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "column_name", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnName {
    Backlog,
    ToDo,
    InProgress,
    Done,
}

/// The fixed column template, in board order
pub const DEFAULT_COLUMNS: [ColumnName; 4] = [
    ColumnName::Backlog,
    ColumnName::ToDo,
    ColumnName::InProgress,
    ColumnName::Done,
];

impl ColumnName {
    /// 1-based display position of this column on every board
    pub fn position(&self) -> i32 {
        match self {
            ColumnName::Backlog => 1,
            ColumnName::ToDo => 2,
            ColumnName::InProgress => 3,
            ColumnName::Done => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnName::Backlog => "BACKLOG",
            ColumnName::ToDo => "TO_DO",
            ColumnName::InProgress => "IN_PROGRESS",
            ColumnName::Done => "DONE",
        }
    }
}

/// A board column row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardColumn {
    pub id: i64,
    pub name: ColumnName,
    pub position: i32,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, name, position, project_id, created_at";

impl BoardColumn {
    /// Inserts the four default columns for a project
    ///
    /// Takes a connection rather than a pool so the inserts can share the
    /// transaction that created the project. Returns the columns ordered by
    /// position.
    pub async fn insert_defaults(conn: &mut PgConnection, project_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let mut columns = Vec::with_capacity(DEFAULT_COLUMNS.len());

        for name in DEFAULT_COLUMNS {
            let column = sqlx::query_as::<_, BoardColumn>(&format!(
                "INSERT INTO board_columns (name, position, project_id) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
            ))
            .bind(name)
            .bind(name.position())
            .bind(project_id)
            .fetch_one(&mut *conn)
            .await?;

            columns.push(column);
        }

        Ok(columns)
    }

    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, BoardColumn>(&format!("SELECT {COLUMNS} FROM board_columns WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Columns of a project ordered by position
    pub async fn list_by_project<'e, E>(executor: E, project_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, BoardColumn>(&format!(
            "SELECT {COLUMNS} FROM board_columns WHERE project_id = $1 ORDER BY position, id"
        ))
        .bind(project_id)
        .fetch_all(executor)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns_are_in_board_order() {
        let positions: Vec<i32> = DEFAULT_COLUMNS.iter().map(ColumnName::position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);

        let names: Vec<&str> = DEFAULT_COLUMNS.iter().map(ColumnName::as_str).collect();
        assert_eq!(names, vec!["BACKLOG", "TO_DO", "IN_PROGRESS", "DONE"]);
    }

    #[test]
    fn test_column_name_serde_matches_as_str() {
        for name in DEFAULT_COLUMNS {
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(json, format!("\"{}\"", name.as_str()));
        }
    }
}
