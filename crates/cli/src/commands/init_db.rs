//! Table creation.
//!
//! # Usage
//!
//! ```bash
//! menuhub-cli init-db
//! ```
//!
//! Applies the schema embedded in `menuhub-api`. Safe to run repeatedly;
//! already-applied scripts are skipped. The API server runs the same step
//! on startup.

use menuhub_api::db;

use super::{CliError, connect};

/// Create every table that does not exist yet.
///
/// # Errors
///
/// Returns `CliError` if configuration is missing, the database is
/// unreachable, or a script fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Creating tables...");
    db::run_migrations(&pool).await?;

    tracing::info!("Database schema ready");
    Ok(())
}
