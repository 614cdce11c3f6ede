//! Notification join rows: `notification_shops` and `notification_users`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use menuhub_core::{NotificationId, NotificationShopId, NotificationUserId, ShopId, UserId};

use super::{RepositoryError, map_fk_violation};
use crate::models::{NotificationShop, NotificationUser};

#[derive(Debug, sqlx::FromRow)]
struct NotificationShopRow {
    id: i32,
    notification_id: i32,
    shop_id: i32,
    created_at: DateTime<Utc>,
}

impl From<NotificationShopRow> for NotificationShop {
    fn from(row: NotificationShopRow) -> Self {
        Self {
            id: NotificationShopId::new(row.id),
            notification_id: NotificationId::new(row.notification_id),
            shop_id: ShopId::new(row.shop_id),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NotificationUserRow {
    id: i32,
    notification_id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
}

impl From<NotificationUserRow> for NotificationUser {
    fn from(row: NotificationUserRow) -> Self {
        Self {
            id: NotificationUserId::new(row.id),
            notification_id: NotificationId::new(row.notification_id),
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
        }
    }
}

/// Repository for both notification join tables.
pub struct NotificationLinkRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationLinkRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification or shop does not exist.
    pub async fn create_shop_link(
        &self,
        notification_id: NotificationId,
        shop_id: ShopId,
    ) -> Result<NotificationShop, RepositoryError> {
        let row: NotificationShopRow = sqlx::query_as(
            r"
            INSERT INTO notification_shops (notification_id, shop_id)
            VALUES ($1, $2)
            RETURNING id, notification_id, shop_id, created_at
            ",
        )
        .bind(notification_id)
        .bind(shop_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "Notification or shop"))?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_shop_links(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<NotificationShop>, RepositoryError> {
        let rows: Vec<NotificationShopRow> = sqlx::query_as(
            r"
            SELECT id, notification_id, shop_id, created_at FROM notification_shops
            ORDER BY id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_shop_link(
        &self,
        id: NotificationShopId,
    ) -> Result<Option<NotificationShop>, RepositoryError> {
        let row: Option<NotificationShopRow> = sqlx::query_as(
            "SELECT id, notification_id, shop_id, created_at FROM notification_shops WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification or user does not exist.
    pub async fn create_user_link(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
    ) -> Result<NotificationUser, RepositoryError> {
        let row: NotificationUserRow = sqlx::query_as(
            r"
            INSERT INTO notification_users (notification_id, user_id)
            VALUES ($1, $2)
            RETURNING id, notification_id, user_id, created_at
            ",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "Notification or user"))?;
        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_user_links(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<NotificationUser>, RepositoryError> {
        let rows: Vec<NotificationUserRow> = sqlx::query_as(
            r"
            SELECT id, notification_id, user_id, created_at FROM notification_users
            ORDER BY id
            LIMIT $1 OFFSET $2
            ",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_user_link(
        &self,
        id: NotificationUserId,
    ) -> Result<Option<NotificationUser>, RepositoryError> {
        let row: Option<NotificationUserRow> = sqlx::query_as(
            "SELECT id, notification_id, user_id, created_at FROM notification_users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
