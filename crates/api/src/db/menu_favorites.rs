//! Menu favorite repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use menuhub_core::{MenuId, UserId};

use super::{RepositoryError, map_fk_violation};
use crate::models::MenuFavorite;

#[derive(Debug, sqlx::FromRow)]
struct MenuFavoriteRow {
    user_id: i32,
    menu_id: i32,
    created_at: DateTime<Utc>,
}

impl From<MenuFavoriteRow> for MenuFavorite {
    fn from(row: MenuFavoriteRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            menu_id: MenuId::new(row.menu_id),
            created_at: row.created_at,
        }
    }
}

/// Repository for per-menu bookmarks.
pub struct MenuFavoriteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuFavoriteRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<MenuFavorite>, RepositoryError> {
        let rows: Vec<MenuFavoriteRow> = sqlx::query_as(
            r"
            SELECT user_id, menu_id, created_at FROM menu_favorites
            WHERE user_id = $1
            ORDER BY created_at DESC, menu_id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Bookmark a menu. Returns the row and whether it was newly created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or menu does not exist.
    pub async fn add(
        &self,
        user_id: UserId,
        menu_id: MenuId,
    ) -> Result<(MenuFavorite, bool), RepositoryError> {
        let inserted: Option<MenuFavoriteRow> = sqlx::query_as(
            r"
            INSERT INTO menu_favorites (user_id, menu_id) VALUES ($1, $2)
            ON CONFLICT (user_id, menu_id) DO NOTHING
            RETURNING user_id, menu_id, created_at
            ",
        )
        .bind(user_id)
        .bind(menu_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "User or menu"))?;

        if let Some(row) = inserted {
            return Ok((row.into(), true));
        }

        let existing: MenuFavoriteRow = sqlx::query_as(
            r"
            SELECT user_id, menu_id, created_at FROM menu_favorites
            WHERE user_id = $1 AND menu_id = $2
            ",
        )
        .bind(user_id)
        .bind(menu_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound("Menu favorite"))?;
        Ok((existing.into(), false))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, user_id: UserId, menu_id: MenuId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM menu_favorites WHERE user_id = $1 AND menu_id = $2)",
        )
        .bind(user_id)
        .bind(menu_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// Returns whether a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, menu_id: MenuId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM menu_favorites WHERE user_id = $1 AND menu_id = $2")
            .bind(user_id)
            .bind(menu_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
