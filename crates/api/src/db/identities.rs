//! Cross-kind account identity rows.
//!
//! Every user and shop user has exactly one row in `account_identities`.
//! Inserting it in the same transaction as the account makes the unique
//! constraints on that table the single authority for username and email
//! collisions across both kinds.

use sqlx::{PgConnection, PgPool};

use menuhub_core::{AccountKind, Email, ShopUserId, UserId, Username};

use super::RepositoryError;

/// Map a unique violation to a `Conflict` naming the clashing field.
///
/// Works for the constraints on `users`, `shop_users` and
/// `account_identities`, whose names all contain the column name.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or_default();
        let message = if constraint.contains("email") {
            "Email already registered"
        } else if constraint.contains("username") {
            "Username already registered"
        } else {
            "Account already exists"
        };
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(err)
}

/// The account an identity row points at.
#[derive(Debug, Clone, Copy)]
pub(crate) enum IdentityOwner {
    User(UserId),
    ShopUser(ShopUserId),
}

impl IdentityOwner {
    const fn kind(self) -> AccountKind {
        match self {
            Self::User(_) => AccountKind::User,
            Self::ShopUser(_) => AccountKind::ShopUser,
        }
    }
}

/// Insert the identity row for a freshly created account.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    owner: IdentityOwner,
    username: &Username,
    email: &Email,
) -> Result<(), RepositoryError> {
    let (user_id, shop_user_id) = match owner {
        IdentityOwner::User(id) => (Some(id), None),
        IdentityOwner::ShopUser(id) => (None, Some(id)),
    };

    sqlx::query(
        r"
        INSERT INTO account_identities (kind, username, email, user_id, shop_user_id)
        VALUES ($1, $2, $3, $4, $5)
        ",
    )
    .bind(owner.kind())
    .bind(username)
    .bind(email)
    .bind(user_id)
    .bind(shop_user_id)
    .execute(conn)
    .await
    .map_err(map_unique_violation)?;

    Ok(())
}

/// Mirror a username/email change onto the identity row.
pub(crate) async fn update(
    conn: &mut PgConnection,
    owner: IdentityOwner,
    username: &Username,
    email: &Email,
) -> Result<(), RepositoryError> {
    let query = match owner {
        IdentityOwner::User(id) => sqlx::query(
            "UPDATE account_identities SET username = $1, email = $2 WHERE user_id = $3",
        )
        .bind(username)
        .bind(email)
        .bind(id),
        IdentityOwner::ShopUser(id) => sqlx::query(
            "UPDATE account_identities SET username = $1, email = $2 WHERE shop_user_id = $3",
        )
        .bind(username)
        .bind(email)
        .bind(id),
    };

    query.execute(conn).await.map_err(map_unique_violation)?;
    Ok(())
}

/// Whether any account of either kind uses this username.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, RepositoryError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM account_identities WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Whether any account of either kind uses this email.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, RepositoryError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM account_identities WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}
