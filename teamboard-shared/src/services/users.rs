/// Identity and credentials
///
/// Registration, login, token refresh and profile maintenance. Passwords are
/// hashed with Argon2id before they reach the store.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use teamboard_shared::auth::jwt::JwtSettings;
/// use teamboard_shared::services::users::{Registration, UserService};
/// use teamboard_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let users = UserService::new(
///     Arc::new(MemoryStore::new()),
///     JwtSettings::new("a-secret-that-is-at-least-32-bytes-long"),
/// );
///
/// users
///     .register(Registration {
///         name: "Ada Lovelace".to_string(),
///         email: "ada@example.com".to_string(),
///         password: "analytical-engine".to_string(),
///         avatar_initials: None,
///     })
///     .await?;
///
/// let tokens = users.authenticate("ada@example.com", "analytical-engine").await?;
/// assert_eq!(tokens.username, "ada@example.com");
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::{require_non_blank, ServiceError, ServiceResult};
use crate::auth::jwt::{validate_refresh_token, JwtSettings, TokenType};
use crate::auth::password::{hash_password, verify_password};
use crate::models::user::{initials_from_name, NewUser, User, MAX_INITIALS_LEN};
use crate::store::Store;

const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Trims caller-supplied initials; blank means none
fn supplied_initials(raw: Option<String>) -> ServiceResult<Option<String>> {
    let Some(initials) = raw.map(|i| i.trim().to_string()).filter(|i| !i.is_empty()) else {
        return Ok(None);
    };

    if initials.chars().count() > MAX_INITIALS_LEN {
        return Err(ServiceError::Validation(format!(
            "Avatar initials must be at most {} characters",
            MAX_INITIALS_LEN
        )));
    }
    Ok(Some(initials))
}

/// Registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    /// Plaintext, hashed before storage
    pub password: String,
    /// Derived from `name` when absent or blank
    pub avatar_initials: Option<String>,
}

/// Profile changes; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_initials: Option<String>,
}

/// Result of a successful login or refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// The login email
    pub username: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

pub struct UserService {
    store: Arc<dyn Store>,
    jwt: JwtSettings,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, jwt: JwtSettings) -> Self {
        Self { store, jwt }
    }

    pub fn jwt(&self) -> &JwtSettings {
        &self.jwt
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank name, email or password, or initials
    ///   longer than the column allows
    /// - `Conflict` if the email is already registered
    pub async fn register(&self, registration: Registration) -> ServiceResult<User> {
        require_non_blank(&registration.name, "Name is required")?;
        require_non_blank(&registration.email, "Email is required")?;
        require_non_blank(&registration.password, "Password is required")?;
        let explicit = supplied_initials(registration.avatar_initials)?;

        let email = registration.email.trim().to_string();
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email is already registered".to_string()));
        }

        let name = registration.name.trim().to_string();
        let avatar_initials = explicit.or_else(|| initials_from_name(&name));

        let user = self
            .store
            .create_user(NewUser {
                name,
                email,
                password_hash: hash_password(&registration.password)?,
                avatar_initials,
            })
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues an access/refresh token pair
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<TokenPair> {
        let Some(user) = self.store.find_user_by_email(email.trim()).await? else {
            debug!("Login attempt for unknown email");
            return Err(ServiceError::Authentication(BAD_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(ServiceError::Authentication(BAD_CREDENTIALS.to_string()));
        }

        info!(user_id = user.id, "User logged in");
        Ok(TokenPair {
            access_token: self.jwt.issue(&user.email, TokenType::Access)?,
            refresh_token: self.jwt.issue(&user.email, TokenType::Refresh)?,
            username: user.email,
            expires_in: self.jwt.access_ttl_seconds,
        })
    }

    /// Issues a new access token from a refresh token
    ///
    /// The refresh token is returned unchanged in the pair.
    ///
    /// # Errors
    ///
    /// `Authentication` if the token is invalid, expired, an access token,
    /// or names a user that no longer exists.
    pub async fn refresh(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        let claims = validate_refresh_token(refresh_token, &self.jwt.secret)?;

        if self.store.find_user_by_email(&claims.sub).await?.is_none() {
            return Err(ServiceError::Authentication("Invalid refresh token".to_string()));
        }

        Ok(TokenPair {
            access_token: self.jwt.issue(&claims.sub, TokenType::Access)?,
            refresh_token: refresh_token.to_string(),
            username: claims.sub,
            expires_in: self.jwt.access_ttl_seconds,
        })
    }

    pub async fn get(&self, id: i64) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Loads users by ID into a map, for building response projections
    pub async fn lookup(&self, ids: &[i64]) -> ServiceResult<HashMap<i64, User>> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let users = self.store.find_users(&unique).await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }

    /// Updates name, email and avatar initials; never touches the password
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist
    /// - `Validation` for a blank name or email, or overlong initials
    /// - `Conflict` if the new email belongs to someone else
    pub async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> ServiceResult<User> {
        let mut user = self.get(user_id).await?;

        if let Some(name) = update.name {
            require_non_blank(&name, "Name is required")?;
            user.name = name.trim().to_string();
        }

        if let Some(email) = update.email {
            require_non_blank(&email, "Email is required")?;
            let email = email.trim().to_string();
            if email != user.email {
                if let Some(other) = self.store.find_user_by_email(&email).await? {
                    if other.id != user.id {
                        return Err(ServiceError::Conflict("Email is already registered".to_string()));
                    }
                }
            }
            user.email = email;
        }

        if let Some(initials) = update.avatar_initials {
            user.avatar_initials = supplied_initials(Some(initials))?;
        }

        let updated = self
            .store
            .update_user(&user)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        info!(user_id, "User profile updated");
        Ok(updated)
    }

    /// Replaces the password after verifying the current one
    ///
    /// # Errors
    ///
    /// - `Authentication` if `current_password` does not match
    /// - `Validation` if `new_password` is blank
    pub async fn change_password(
        &self,
        user_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let mut user = self.get(user_id).await?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(ServiceError::Authentication(
                "Current password is incorrect".to_string(),
            ));
        }
        require_non_blank(new_password, "New password is required")?;

        user.password_hash = hash_password(new_password)?;
        self.store
            .update_user(&user)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        info!(user_id, "User password changed");
        Ok(())
    }
}
