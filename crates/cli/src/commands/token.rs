//! Debug access tokens.
//!
//! # Usage
//!
//! ```bash
//! menuhub-cli token alice
//! menuhub-cli token --kind shop_user sushi_taro --ttl-minutes 5
//! ```
//!
//! Signs with `MENUHUB_JWT_SECRET`, so the API must share the same
//! environment. The token goes to stdout on its own line.

use menuhub_api::config::ApiConfig;
use menuhub_api::db::{self, ShopUserRepository, UserRepository};
use menuhub_api::services::auth::{AuthError, TokenIssuer, ttl_from_minutes};
use menuhub_core::AccountKind;
use sqlx::PgPool;

use super::CliError;

/// Issue a token for an existing account.
///
/// # Errors
///
/// Returns `CliError::UnknownAccount` if no account of `kind` has that
/// username, or another variant if configuration or the database fails.
pub async fn issue(
    username: &str,
    kind: AccountKind,
    ttl_minutes: Option<i64>,
) -> Result<(), CliError> {
    let config = ApiConfig::from_env()?;
    let pool = db::connect_with_retry(&config.database_url, &config.database).await?;

    if !account_exists(&pool, username, kind).await? {
        return Err(CliError::UnknownAccount {
            kind: kind.to_string(),
            username: username.to_owned(),
        });
    }

    let ttl = match ttl_minutes {
        Some(minutes) => ttl_from_minutes(minutes).ok_or(AuthError::TokenLifetime)?,
        None => config.token_ttl,
    };
    let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl);
    let token = tokens.issue_with_ttl(username, kind, ttl)?;

    tracing::info!(
        username,
        user_type = kind.as_str(),
        ttl_minutes = ttl.num_minutes(),
        "Issued token"
    );
    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}

async fn account_exists(
    pool: &PgPool,
    username: &str,
    kind: AccountKind,
) -> Result<bool, CliError> {
    let exists = match kind {
        AccountKind::User => UserRepository::new(pool)
            .get_by_username(username)
            .await?
            .is_some(),
        AccountKind::ShopUser => ShopUserRepository::new(pool)
            .get_by_username(username)
            .await?
            .is_some(),
    };
    Ok(exists)
}
