//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MENUHUB_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `MENUHUB_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `MENUHUB_HOST` - Bind address (default: 127.0.0.1)
//! - `MENUHUB_PORT` - Listen port (default: 8000)
//! - `MENUHUB_TOKEN_TTL_MINUTES` - Access token lifetime (default: 30)
//! - `MENUHUB_UPLOAD_DIR` - Directory for uploaded images (default: `static/images`)
//! - `MENUHUB_UPLOAD_URL_PREFIX` - URL prefix returned for uploads (default: `/static/images`)
//! - `MENUHUB_DB_POOL_SIZE` - Maximum pooled connections (default: 5)
//! - `MENUHUB_DB_ACQUIRE_TIMEOUT_SECS` - Connection acquire timeout (default: 20)
//! - `MENUHUB_DB_MAX_LIFETIME_SECS` - Connection recycle age (default: 300)
//! - `MENUHUB_DB_STATEMENT_TIMEOUT_SECS` - Server-side statement timeout (default: 30)
//! - `MENUHUB_DB_CONNECT_ATTEMPTS` - Startup connection attempts (default: 10)
//! - `MENUHUB_DB_CONNECT_BACKOFF_SECS` - Delay between startup attempts (default: 3)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::services::auth::{MAX_TTL_MINUTES, ttl_from_minutes};

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// HS256 signing secret for access tokens
    pub jwt_secret: SecretString,
    /// Lifetime of issued access tokens
    pub token_ttl: chrono::Duration,
    /// Image upload storage
    pub uploads: UploadConfig,
    /// Connection pool and startup retry settings
    pub database: DatabaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Where uploaded images are written and how they are addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub url_prefix: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("static/images"),
            url_prefix: "/static/images".to_owned(),
        }
    }
}

/// Pool bounds and startup connection policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub pool_size: u32,
    pub acquire_timeout: Duration,
    pub max_lifetime: Duration,
    pub statement_timeout: Duration,
    pub connect_attempts: u32,
    pub connect_backoff: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            pool_size: 5,
            acquire_timeout: Duration::from_secs(20),
            max_lifetime: Duration::from_secs(300),
            statement_timeout: Duration::from_secs(30),
            connect_attempts: 10,
            connect_backoff: Duration::from_secs(3),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the JWT secret fails validation (length, placeholder detection,
    /// entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MENUHUB_DATABASE_URL")?;
        let host = parse_env_or_default::<IpAddr>("MENUHUB_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("MENUHUB_PORT", "8000")?;

        let jwt_secret = get_validated_secret("MENUHUB_JWT_SECRET")?;
        validate_jwt_secret_length(&jwt_secret, "MENUHUB_JWT_SECRET")?;

        let ttl_minutes = parse_env_or_default::<i64>("MENUHUB_TOKEN_TTL_MINUTES", "30")?;
        let token_ttl = token_ttl_from_minutes(ttl_minutes, "MENUHUB_TOKEN_TTL_MINUTES")?;

        let uploads = UploadConfig {
            dir: PathBuf::from(get_env_or_default("MENUHUB_UPLOAD_DIR", "static/images")),
            url_prefix: get_env_or_default("MENUHUB_UPLOAD_URL_PREFIX", "/static/images")
                .trim_end_matches('/')
                .to_owned(),
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl,
            uploads,
            database: DatabaseConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Database settings alone, for tools that never sign tokens.
///
/// # Errors
///
/// Returns `ConfigError` if the URL is missing or a pool setting is invalid.
pub fn database_from_env() -> Result<(SecretString, DatabaseConfig), ConfigError> {
    let _ = dotenvy::dotenv();
    Ok((
        get_database_url("MENUHUB_DATABASE_URL")?,
        DatabaseConfig::from_env()?,
    ))
}

impl DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| -> Result<Duration, ConfigError> {
            parse_env_or_default::<u64>(key, &default.as_secs().to_string())
                .map(Duration::from_secs)
        };

        let pool_size =
            parse_env_or_default::<u32>("MENUHUB_DB_POOL_SIZE", &defaults.pool_size.to_string())?;
        if pool_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MENUHUB_DB_POOL_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            pool_size,
            acquire_timeout: secs("MENUHUB_DB_ACQUIRE_TIMEOUT_SECS", defaults.acquire_timeout)?,
            max_lifetime: secs("MENUHUB_DB_MAX_LIFETIME_SECS", defaults.max_lifetime)?,
            statement_timeout: secs(
                "MENUHUB_DB_STATEMENT_TIMEOUT_SECS",
                defaults.statement_timeout,
            )?,
            connect_attempts: parse_env_or_default::<u32>(
                "MENUHUB_DB_CONNECT_ATTEMPTS",
                &defaults.connect_attempts.to_string(),
            )?
            .max(1),
            connect_backoff: secs("MENUHUB_DB_CONNECT_BACKOFF_SECS", defaults.connect_backoff)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, using `default` when it is unset.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Convert a configured lifetime, bounded to `1..=MAX_TTL_MINUTES`.
fn token_ttl_from_minutes(minutes: i64, key: &str) -> Result<chrono::Duration, ConfigError> {
    ttl_from_minutes(minutes).ok_or_else(|| {
        ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 1 and {MAX_TTL_MINUTES} minutes"),
        )
    })
}

/// Validate that the signing secret meets minimum length requirements.
fn validate_jwt_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-jwt-key-goes-here", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_rejects_blocklisted_word() {
        // Common placeholder secrets
        assert!(validate_secret_strength("your-secret-key", "TEST_VAR").is_err());
        assert!(validate_secret_strength("changeme123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err =
            validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_jwt_secret_too_short() {
        let secret = SecretString::from("Zq8#kL2!");
        assert!(validate_jwt_secret_length(&secret, "TEST_JWT").is_err());
    }

    #[test]
    fn test_validate_jwt_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_jwt_secret_length(&secret, "TEST_JWT").is_ok());
    }

    #[test]
    fn test_parse_env_or_default_uses_default() {
        let port: u16 = parse_env_or_default("MENUHUB_TEST_UNSET_PORT", "8000").unwrap();
        assert_eq!(port, 8000);

        let err = parse_env_or_default::<u16>("MENUHUB_TEST_UNSET_PORT", "eighty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "MENUHUB_TEST_UNSET_PORT"));
    }

    #[test]
    fn test_token_ttl_bounds() {
        assert_eq!(
            token_ttl_from_minutes(30, "TTL").unwrap(),
            chrono::Duration::minutes(30)
        );
        assert!(token_ttl_from_minutes(MAX_TTL_MINUTES, "TTL").is_ok());

        for minutes in [0, -5, MAX_TTL_MINUTES + 1, i64::MAX] {
            let err = token_ttl_from_minutes(minutes, "TTL").unwrap_err();
            assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "TTL"));
        }
    }

    #[test]
    fn test_database_defaults() {
        let db = DatabaseConfig::default();
        assert_eq!(db.pool_size, 5);
        assert_eq!(db.acquire_timeout, Duration::from_secs(20));
        assert_eq!(db.max_lifetime, Duration::from_secs(300));
        assert_eq!(db.connect_attempts, 10);
        assert_eq!(db.connect_backoff, Duration::from_secs(3));
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            jwt_secret: SecretString::from("x".repeat(32)),
            token_ttl: chrono::Duration::minutes(30),
            uploads: UploadConfig::default(),
            database: DatabaseConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://menuhub:hunter2@db/menuhub"),
            host: "0.0.0.0".parse().unwrap(),
            port: 8000,
            jwt_secret: SecretString::from("very_private_signing_material_0123"),
            token_ttl: chrono::Duration::minutes(30),
            uploads: UploadConfig::default(),
            database: DatabaseConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("static/images"));
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("very_private_signing_material"));
    }
}
