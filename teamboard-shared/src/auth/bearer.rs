/// Bearer token resolution
///
/// Turns an `Authorization` header value into the stored [`User`] it names.
/// The HTTP layer runs this for every protected request and places the
/// resulting [`AuthContext`] in the request extensions.
///
/// # Example
///
/// ```no_run
/// use teamboard_shared::auth::bearer::resolve_caller;
/// use teamboard_shared::store::Store;
///
/// # async fn example(store: &dyn Store, header: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
/// let caller = resolve_caller(store, "jwt-secret", header).await?;
/// println!("Request made by {}", caller.email);
/// # Ok(())
/// # }
/// ```

use tracing::debug;

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::User;
use crate::store::{Store, StoreError};

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.user.id
    }
}

/// Error type for bearer resolution
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token failed signature, expiry, issuer or type checks
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is valid but its subject is not a stored user
    #[error("User not found for token subject")]
    UnknownUser,

    /// Store lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingCredentials)?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Resolves the caller named by an access token
///
/// # Errors
///
/// Every failure other than a store error means the request is
/// unauthenticated.
pub async fn resolve_caller(
    store: &dyn Store,
    secret: &str,
    header: Option<&str>,
) -> Result<User, AuthError> {
    let token = extract_bearer_token(header)?;

    let claims = validate_access_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        other => AuthError::InvalidToken(other.to_string()),
    })?;

    let user = store
        .find_user_by_email(&claims.sub)
        .await?
        .ok_or(AuthError::UnknownUser)?;

    debug!(user_id = user.id, "Resolved caller from bearer token");
    Ok(user)
}
