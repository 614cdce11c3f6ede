//! MenuHub CLI - database setup and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Create tables (the API also does this on startup)
//! menuhub-cli init-db
//!
//! # Insert the sample area and shop
//! menuhub-cli seed
//!
//! # Print an access token for an existing account
//! menuhub-cli token alice
//! menuhub-cli token --kind shop_user sushi_taro
//! ```
//!
//! Reads the same `MENUHUB_*` environment variables (and `.env`) as the API.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use menuhub_api::services::auth::MAX_TTL_MINUTES;
use menuhub_core::AccountKind;

mod commands;

#[derive(Parser)]
#[command(name = "menuhub-cli")]
#[command(author, version, about = "MenuHub operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create database tables
    InitDb,
    /// Insert sample data (one area and one shop)
    Seed,
    /// Issue an access token for an existing account
    Token {
        /// Account username
        username: String,

        /// Account kind (`user` or `shop_user`)
        #[arg(short, long, default_value = "user")]
        kind: AccountKind,

        /// Lifetime override in minutes (at most 30 days)
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_TTL_MINUTES))]
        ttl_minutes: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::InitDb => commands::init_db::run().await,
        Commands::Seed => commands::seed::run().await,
        Commands::Token {
            username,
            kind,
            ttl_minutes,
        } => commands::token::issue(&username, kind, ttl_minutes).await,
    }
}
