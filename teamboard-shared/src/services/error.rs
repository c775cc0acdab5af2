//! Error kinds raised by the lifecycle services.

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// A business-rule violation or backend failure
///
/// The HTTP layer maps each variant to a status code; nothing inspects the
/// message text.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    /// Bad credentials or an unusable token
    #[error("{0}")]
    Authentication(String),

    /// Authenticated but not permitted
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Duplicate name, email or membership
    #[error("{0}")]
    Conflict(String),

    /// Attempt to remove the workspace owner from its members
    #[error("Cannot remove the workspace owner")]
    CannotRemoveOwner,

    /// Unexpected failure; details are logged, not returned
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        ServiceError::NotFound(format!("{} not found with id: {}", entity, id))
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::Database(e) => ServiceError::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ServiceError::Internal(msg),
            other => ServiceError::Authentication(other.to_string()),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Fails with `Validation(message)` when `value` is empty or whitespace
pub(crate) fn require_non_blank(value: &str, message: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: ServiceError = StoreError::Conflict("dup".to_string()).into();
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == "dup"));

        let err: ServiceError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_jwt_errors_map_by_kind() {
        assert!(matches!(
            ServiceError::from(JwtError::Expired),
            ServiceError::Authentication(_)
        ));
        assert!(matches!(
            ServiceError::from(JwtError::CreateError("boom".to_string())),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("name", "required").is_ok());
        assert!(matches!(
            require_non_blank("  \n", "Name is required"),
            Err(ServiceError::Validation(msg)) if msg == "Name is required"
        ));
    }
}
