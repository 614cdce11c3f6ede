//! Database operations for the MenuHub `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users`, `shop_users` - The two account kinds
//! - `account_identities` - Cross-kind username/email uniqueness
//! - `areas`, `genres`, `shops`, `menus` - Catalog
//! - `favorites`, `menu_favorites` - Per-user bookmarks
//! - `notifications`, `notification_shops`, `notification_users` - Notification fan-out
//!
//! # Schema
//!
//! The schema is stored in `crates/api/migrations/` and applied on startup
//! (see [`run_migrations`]) or explicitly via:
//! ```bash
//! cargo run -p menuhub-cli -- init-db
//! ```

pub mod areas;
pub mod favorites;
pub mod genres;
pub mod identities;
pub mod menu_favorites;
pub mod menus;
pub mod notification_links;
pub mod notifications;
pub mod shop_users;
pub mod shops;
pub mod users;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

pub use areas::AreaRepository;
pub use favorites::FavoriteRepository;
pub use genres::GenreRepository;
pub use menu_favorites::MenuFavoriteRepository;
pub use menus::MenuRepository;
pub use notification_links::NotificationLinkRepository;
pub use notifications::NotificationRepository;
pub use shop_users::ShopUserRepository;
pub use shops::ShopRepository;
pub use users::UserRepository;

use crate::config::DatabaseConfig;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity (or an entity it references) was not found.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Constraint violation (e.g., unique email).
    #[error("{0}")]
    Conflict(String),
}

/// Classify foreign key violations as a missing referenced entity.
///
/// `target` names the referenced entity for the error message.
pub(crate) fn map_fk_violation(err: sqlx::Error, target: &'static str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::NotFound(target);
    }
    RepositoryError::Database(err)
}

/// Build pool options from configuration.
///
/// Connections are pinged before being handed out and carry a server-side
/// `statement_timeout`.
#[must_use]
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(config.acquire_timeout)
        .max_lifetime(config.max_lifetime)
        .test_before_acquire(true)
}

/// Parse the connection URL and attach per-session settings.
///
/// # Errors
///
/// Returns `sqlx::Error::Configuration` if the URL is malformed.
pub fn connect_options(
    database_url: &secrecy::SecretString,
    config: &DatabaseConfig,
) -> Result<PgConnectOptions, sqlx::Error> {
    let options: PgConnectOptions = database_url.expose_secret().parse()?;
    let statement_timeout_ms = config.statement_timeout.as_millis().to_string();
    Ok(options.options([("statement_timeout", statement_timeout_ms.as_str())]))
}

/// Create a `PostgreSQL` connection pool, retrying while the server comes up.
///
/// Makes up to `connect_attempts` attempts, sleeping `connect_backoff`
/// between them.
///
/// # Errors
///
/// Returns the last `sqlx::Error` once every attempt has failed.
pub async fn connect_with_retry(
    database_url: &secrecy::SecretString,
    config: &DatabaseConfig,
) -> Result<PgPool, sqlx::Error> {
    let options = connect_options(database_url, config)?;
    let attempts = config.connect_attempts.max(1);

    let mut attempt = 1;
    loop {
        match pool_options(config).connect_with(options.clone()).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "Database not ready, retrying in {}s",
                    config.connect_backoff.as_secs()
                );
                tokio::time::sleep(config.connect_backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Create every table if it does not exist yet.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a script fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_connect_options_sets_statement_timeout() {
        let config = DatabaseConfig {
            statement_timeout: Duration::from_secs(7),
            ..DatabaseConfig::default()
        };
        let url = SecretString::from("postgres://menuhub:pw@localhost:5432/menuhub");
        let options = connect_options(&url, &config).unwrap();

        assert_eq!(options.get_host(), "localhost");
        assert_eq!(options.get_database(), Some("menuhub"));
        assert!(
            options
                .get_options()
                .is_some_and(|o| o.contains("statement_timeout=7000"))
        );
    }

    #[test]
    fn test_connect_options_rejects_garbage_url() {
        let url = SecretString::from("not a url");
        assert!(connect_options(&url, &DatabaseConfig::default()).is_err());
    }

    #[test]
    fn test_repository_error_messages() {
        assert_eq!(RepositoryError::NotFound("Menu").to_string(), "Menu not found");
        assert_eq!(
            RepositoryError::Conflict("Username already registered".to_owned()).to_string(),
            "Username already registered"
        );
    }
}
