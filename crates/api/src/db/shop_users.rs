//! Shop user repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use menuhub_core::{Email, ShopId, ShopUserId, Username};

use super::identities::{self, IdentityOwner, map_unique_violation};
use super::RepositoryError;
use crate::models::ShopUser;

#[derive(Debug, sqlx::FromRow)]
struct ShopUserRow {
    id: i32,
    shop_id: i32,
    username: String,
    email: String,
    address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ShopUserRow> for ShopUser {
    type Error = RepositoryError;

    fn try_from(row: ShopUserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: ShopUserId::new(row.id),
            shop_id: ShopId::new(row.shop_id),
            username,
            email,
            address: row.address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShopUserWithHashRow {
    #[sqlx(flatten)]
    shop_user: ShopUserRow,
    password_hash: String,
}

const SHOP_USER_COLUMNS: &str = "id, shop_id, username, email, address, created_at, updated_at";

/// Column values for a new shop user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewShopUserRecord<'a> {
    pub shop_id: ShopId,
    pub username: &'a Username,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub address: Option<&'a str>,
}

/// Repository for shop user database operations.
pub struct ShopUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopUserRepository<'a> {
    /// Create a new shop user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a shop user by username. Shop users log in with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<ShopUser>, RepositoryError> {
        let row: Option<ShopUserRow> = sqlx::query_as(&format!(
            "SELECT {SHOP_USER_COLUMNS} FROM shop_users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a shop user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(ShopUser, String)>, RepositoryError> {
        let row: Option<ShopUserWithHashRow> = sqlx::query_as(&format!(
            "SELECT {SHOP_USER_COLUMNS}, password_hash FROM shop_users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((ShopUser::try_from(r.shop_user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Create a shop user and its identity row in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email is taken.
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    pub async fn create(&self, new: &NewShopUserRecord<'_>) -> Result<ShopUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: ShopUserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shop_users (shop_id, username, email, password_hash, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SHOP_USER_COLUMNS}
            "
        ))
        .bind(new.shop_id)
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.address)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match map_unique_violation(e) {
            RepositoryError::Database(e) => super::map_fk_violation(e, "Shop"),
            other => other,
        })?;

        let shop_user = ShopUser::try_from(row)?;
        identities::insert(
            &mut tx,
            IdentityOwner::ShopUser(shop_user.id),
            &shop_user.username,
            &shop_user.email,
        )
        .await?;

        tx.commit().await?;
        Ok(shop_user)
    }
}
