/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any
///   (default: http://localhost:5173,http://localhost:3000)
/// - `API_PRODUCTION`: `true` enables HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (optional; the in-memory
///   store is used when absent)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for JWT signing (required, 32+ characters)
/// - `JWT_ACCESS_TTL_SECONDS`: Access token lifetime (default: 86400)
/// - `JWT_REFRESH_TTL_SECONDS`: Refresh token lifetime (default: 604800)
///
/// Token lifetimes must lie between 1 second and ten years.
/// - `RUST_LOG`: Log filter, `LOG_FORMAT=json` for JSON logs
///
/// # Example
///
/// ```no_run
/// use teamboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use teamboard_shared::auth::jwt::JwtSettings;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
const MIN_SECRET_LEN: usize = 32;
/// Ten years
const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means any
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL; `None` selects the in-memory store
    pub url: Option<String>,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Access token lifetime in seconds
    pub access_ttl_seconds: i64,

    /// Refresh token lifetime in seconds
    pub refresh_ttl_seconds: i64,
}

impl JwtConfig {
    pub fn settings(&self) -> JwtSettings {
        JwtSettings {
            secret: self.secret.clone(),
            access_ttl_seconds: self.access_ttl_seconds,
            refresh_ttl_seconds: self.refresh_ttl_seconds,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Parses a token lifetime in seconds, rejecting values outside
/// `1..=MAX_TTL_SECONDS`
pub fn parse_ttl(name: &str, raw: &str) -> anyhow::Result<i64> {
    let seconds = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| anyhow::anyhow!("{} must be a whole number of seconds: {}", name, e))?;

    if !(1..=MAX_TTL_SECONDS).contains(&seconds) {
        anyhow::bail!(
            "{} must be between 1 and {} seconds, got {}",
            name,
            MAX_TTL_SECONDS,
            seconds
        );
    }
    Ok(seconds)
}

/// Splits a comma-separated origin list, dropping empty entries
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric or boolean variable has an invalid value
    /// - A token lifetime is not positive or exceeds ten years
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = var_or("API_PORT", "8080").parse::<u16>()?;
        let cors_origins = parse_origins(&var_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS));
        let production = var_or("API_PRODUCTION", "false").parse::<bool>()?;

        let database_url = env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty());
        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10").parse::<u32>()?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let defaults = JwtSettings::new(String::new());
        let access_ttl_seconds = match env::var("JWT_ACCESS_TTL_SECONDS") {
            Ok(v) => parse_ttl("JWT_ACCESS_TTL_SECONDS", &v)?,
            Err(_) => defaults.access_ttl_seconds,
        };
        let refresh_ttl_seconds = match env::var("JWT_REFRESH_TTL_SECONDS") {
            Ok(v) => parse_ttl("JWT_REFRESH_TTL_SECONDS", &v)?,
            Err(_) => defaults.refresh_ttl_seconds,
        };

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_ttl_seconds,
                refresh_ttl_seconds,
            },
        })
    }

    /// Configuration for tests: in-memory store, permissive CORS
    pub fn for_tests(secret: impl Into<String>) -> Self {
        let jwt = JwtSettings::new(secret);
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: jwt.secret,
                access_ttl_seconds: jwt.access_ttl_seconds,
                refresh_ttl_seconds: jwt.refresh_ttl_seconds,
            },
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let mut config = Config::for_tests("test-secret-key-at-least-32-bytes-long");
        config.api.port = 8080;

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test ,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_ttl_bounds() {
        assert_eq!(parse_ttl("TTL", "900").unwrap(), 900);
        assert_eq!(parse_ttl("TTL", " 1 ").unwrap(), 1);
        assert_eq!(parse_ttl("TTL", &MAX_TTL_SECONDS.to_string()).unwrap(), MAX_TTL_SECONDS);

        for raw in ["0", "-60", "315360001", "9223372036854775807", "1h", ""] {
            let err = parse_ttl("JWT_ACCESS_TTL_SECONDS", raw).unwrap_err();
            assert!(err.to_string().contains("JWT_ACCESS_TTL_SECONDS"), "{raw}: {err}");
        }
    }

    #[test]
    fn test_jwt_settings_carry_ttls() {
        let mut config = Config::for_tests("test-secret-key-at-least-32-bytes-long");
        config.jwt.access_ttl_seconds = 60;

        let settings = config.jwt.settings();
        assert_eq!(settings.access_ttl_seconds, 60);
        assert_eq!(settings.refresh_ttl_seconds, 604_800);
        assert_eq!(settings.secret, "test-secret-key-at-least-32-bytes-long");
    }
}
