/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: JWT issuance and validation (subject = user email)
/// - [`bearer`]: resolving the caller from an `Authorization` header
/// - [`authorization`]: the owner-or-member access predicate and ownership checks
///
/// # Example
///
/// ```no_run
/// use teamboard_shared::auth::password::{hash_password, verify_password};
/// use teamboard_shared::auth::jwt::{JwtSettings, TokenType};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let settings = JwtSettings::new("a-secret-that-is-at-least-32-bytes-long");
/// let token = settings.issue("user@example.com", TokenType::Access)?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod bearer;
pub mod jwt;
pub mod password;
