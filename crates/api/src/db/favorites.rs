//! Shop favorite repository.
//!
//! Adding is idempotent: a duplicate insert is absorbed by
//! `ON CONFLICT DO NOTHING` and the existing row is returned instead.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use menuhub_core::{ShopId, UserId};

use super::{RepositoryError, map_fk_violation};
use crate::models::{Favorite, Shop};

#[derive(Debug, sqlx::FromRow)]
struct FavoriteRow {
    user_id: i32,
    shop_id: i32,
    created_at: DateTime<Utc>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            shop_id: ShopId::new(row.shop_id),
            created_at: row.created_at,
        }
    }
}

/// Repository for shop favorites.
pub struct FavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FavoriteRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's favorite rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows: Vec<FavoriteRow> = sqlx::query_as(
            r"
            SELECT user_id, shop_id, created_at FROM favorites
            WHERE user_id = $1
            ORDER BY created_at DESC, shop_id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The shops a user has favorited, newest favorite first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_shops(&self, user_id: UserId) -> Result<Vec<Shop>, RepositoryError> {
        super::ShopRepository::new(self.pool)
            .list_favorited_by(user_id)
            .await
    }

    /// Add a favorite.
    ///
    /// Returns the row and whether it was newly created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop does not exist.
    pub async fn add(
        &self,
        user_id: UserId,
        shop_id: ShopId,
    ) -> Result<(Favorite, bool), RepositoryError> {
        let inserted: Option<FavoriteRow> = sqlx::query_as(
            r"
            INSERT INTO favorites (user_id, shop_id) VALUES ($1, $2)
            ON CONFLICT (user_id, shop_id) DO NOTHING
            RETURNING user_id, shop_id, created_at
            ",
        )
        .bind(user_id)
        .bind(shop_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "Shop"))?;

        if let Some(row) = inserted {
            return Ok((row.into(), true));
        }

        let existing = self
            .get(user_id, shop_id)
            .await?
            .ok_or(RepositoryError::NotFound("Favorite"))?;
        Ok((existing, false))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        shop_id: ShopId,
    ) -> Result<Option<Favorite>, RepositoryError> {
        let row: Option<FavoriteRow> = sqlx::query_as(
            "SELECT user_id, shop_id, created_at FROM favorites WHERE user_id = $1 AND shop_id = $2",
        )
        .bind(user_id)
        .bind(shop_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Remove a favorite. Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, shop_id: ShopId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND shop_id = $2")
            .bind(user_id)
            .bind(shop_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
