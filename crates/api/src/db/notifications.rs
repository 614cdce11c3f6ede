//! Notification repository.
//!
//! Notifications are addressed to one user. [`NotificationRepository::fan_out`]
//! creates one per follower of a shop and records the delivery in
//! `notification_users` and `notification_shops` within the same transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use menuhub_core::{NotificationId, NotificationStatus, ShopId, ShopUserId, UserId};

use super::{RepositoryError, map_fk_violation};
use crate::models::{NewNotification, Notification};

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: i32,
    user_id: i32,
    shop_id: Option<i32>,
    shop_user_id: Option<i32>,
    contents: String,
    status: NotificationStatus,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            user_id: UserId::new(row.user_id),
            shop_id: row.shop_id.map(ShopId::new),
            shop_user_id: row.shop_user_id.map(ShopUserId::new),
            contents: row.contents,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

const NOTIFICATION_COLUMNS: &str = "id, user_id, shop_id, shop_user_id, contents, status, created_at";

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an unread notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the recipient does not exist.
    pub async fn create(&self, new: &NewNotification) -> Result<Notification, RepositoryError> {
        let row: NotificationRow = sqlx::query_as(&format!(
            r"
            INSERT INTO notifications (user_id, shop_id, shop_user_id, contents)
            VALUES ($1, $2, $3, $4)
            RETURNING {NOTIFICATION_COLUMNS}
            "
        ))
        .bind(new.user_id)
        .bind(new.shop_id)
        .bind(new.shop_user_id)
        .bind(&new.contents)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "User"))?;
        Ok(row.into())
    }

    /// A user's notifications in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Notification>, RepositoryError> {
        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND status = 'unread'",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: NotificationId) -> Result<Option<Notification>, RepositoryError> {
        let row: Option<NotificationRow> = sqlx::query_as(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Mark one notification read. Marking a read notification again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification does not exist.
    pub async fn mark_read(&self, id: NotificationId) -> Result<Notification, RepositoryError> {
        let row: Option<NotificationRow> = sqlx::query_as(&format!(
            "UPDATE notifications SET status = 'read' WHERE id = $1 RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        row.map(Into::into)
            .ok_or(RepositoryError::NotFound("Notification"))
    }

    /// Mark every unread notification of a user read.
    ///
    /// Returns the number of notifications that changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_all_read(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE notifications SET status = 'read' WHERE user_id = $1 AND status = 'unread'",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a notification. Its join rows cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: NotificationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Notify every user who favorited `shop_id`.
    ///
    /// Returns the created notifications ordered by recipient. A shop with
    /// no followers yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn fan_out(
        &self,
        shop_id: ShopId,
        shop_user_id: Option<ShopUserId>,
        contents: &str,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let rows: Vec<NotificationRow> = sqlx::query_as(&format!(
            r"
            INSERT INTO notifications (user_id, shop_id, shop_user_id, contents)
            SELECT f.user_id, f.shop_id, $2, $3
            FROM favorites f
            WHERE f.shop_id = $1
            ORDER BY f.user_id
            RETURNING {NOTIFICATION_COLUMNS}
            "
        ))
        .bind(shop_id)
        .bind(shop_user_id)
        .bind(contents)
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            tx.commit().await?;
            return Ok(Vec::new());
        }

        let notification_ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let user_ids: Vec<i32> = rows.iter().map(|r| r.user_id).collect();

        sqlx::query(
            r"
            INSERT INTO notification_users (notification_id, user_id)
            SELECT * FROM UNNEST($1::INT[], $2::INT[])
            ",
        )
        .bind(&notification_ids)
        .bind(&user_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO notification_shops (notification_id, shop_id)
            SELECT id, $2 FROM UNNEST($1::INT[]) AS id
            ",
        )
        .bind(&notification_ids)
        .bind(shop_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut rows = rows;
        rows.sort_by_key(|r| (r.user_id, r.id));
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
