/// User model and database operations
///
/// Users are identified by a unique email address, which is also the subject
/// of every token issued to them. Passwords are stored as Argon2id hashes and
/// the hash never leaves this crate in a serialized form.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     name VARCHAR(100) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     avatar_initials VARCHAR(4),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use teamboard_shared::models::user::{NewUser, User};
/// use teamboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, NewUser {
///     name: "Ada Lovelace".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     avatar_initials: Some("AL".to_string()),
/// })
/// .await?;
///
/// let found = User::find_by_email(&pool, "ada@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;

/// Width of the `avatar_initials` column, in characters
pub const MAX_INITIALS_LEN: usize = 4;

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Display name
    pub name: String,

    /// Login identity, unique across all users
    pub email: String,

    /// Argon2id password hash
    ///
    /// Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Up to [`MAX_INITIALS_LEN`] letters shown in place of an avatar
    pub avatar_initials: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
    pub avatar_initials: Option<String>,
}

/// Derives avatar initials from a display name
///
/// Takes the first letter of up to two whitespace-separated words and
/// upper-cases them. Upper-casing can expand a letter (`ß` becomes `SS`), so
/// the result is cut to [`MAX_INITIALS_LEN`]. Returns `None` for a blank name.
///
/// # Example
///
/// ```
/// use teamboard_shared::models::user::initials_from_name;
///
/// assert_eq!(initials_from_name("ada lovelace").as_deref(), Some("AL"));
/// assert_eq!(initials_from_name("Grace").as_deref(), Some("G"));
/// assert_eq!(initials_from_name("   "), None);
/// ```
pub fn initials_from_name(name: &str) -> Option<String> {
    let initials: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(MAX_INITIALS_LEN)
        .collect();

    if initials.is_empty() {
        None
    } else {
        Some(initials)
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique violation) or the
    /// database is unreachable.
    pub async fn create<'e, E>(executor: E, data: NewUser) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, avatar_initials)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, avatar_initials, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.avatar_initials)
        .fetch_one(executor)
        .await
    }

    /// Finds a user by ID
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, avatar_initials, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a user by email address (exact match)
    pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, avatar_initials, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(executor)
        .await
    }

    /// Loads every user whose ID is in `ids`
    ///
    /// Unknown IDs are skipped. Used to resolve display names for response
    /// projections in one round trip.
    pub async fn find_by_ids<'e, E>(executor: E, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, avatar_initials, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await
    }

    /// Writes every mutable column of `user` back to the database
    ///
    /// `updated_at` is set to the current time. Returns `None` if the user no
    /// longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the new email is taken by another user.
    pub async fn update<'e, E>(executor: E, user: &User) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, avatar_initials = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, avatar_initials, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.avatar_initials)
        .fetch_optional(executor)
        .await
    }
}
