//! Subcommand implementations.

pub mod init_db;
pub mod seed;
pub mod token;

use menuhub_api::config::{ConfigError, database_from_env};
use menuhub_api::db::{self, RepositoryError};
use menuhub_api::services::auth::AuthError;
use sqlx::PgPool;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to create tables: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Token error: {0}")]
    Auth(#[from] AuthError),

    #[error("No {kind} named {username}")]
    UnknownAccount { kind: String, username: String },
}

/// Connect using the API's database settings.
async fn connect() -> Result<PgPool, CliError> {
    let (database_url, config) = database_from_env()?;
    tracing::info!("Connecting to database...");
    Ok(db::connect_with_retry(&database_url, &config).await?)
}
