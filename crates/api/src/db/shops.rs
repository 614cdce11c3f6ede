//! Shop repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use menuhub_core::{AreaId, ShopId, UserId};

use super::{RepositoryError, map_fk_violation};
use crate::models::{NewShop, Pagination, Shop, ShopChanges};

#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    id: i32,
    area_id: i32,
    shop_name: String,
    shop_detail: Option<String>,
    image_path: Option<String>,
    homepage_url: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<ShopRow> for Shop {
    fn from(row: ShopRow) -> Self {
        Self {
            id: ShopId::new(row.id),
            area_id: AreaId::new(row.area_id),
            shop_name: row.shop_name,
            shop_detail: row.shop_detail,
            image_path: row.image_path,
            homepage_url: row.homepage_url,
            address: row.address,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SHOP_COLUMNS: &str = "id, area_id, shop_name, shop_detail, image_path, homepage_url, \
                            address, phone, created_at, updated_at";

/// Repository for shop database operations.
pub struct ShopRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List one page of shops, optionally restricted to an area.
    ///
    /// Returns the page and the total number of matching shops.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        area_id: Option<AreaId>,
        pagination: Pagination,
    ) -> Result<(Vec<Shop>, i64), RepositoryError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shops WHERE ($1::INT IS NULL OR area_id = $1)")
                .bind(area_id)
                .fetch_one(self.pool)
                .await?;

        let rows: Vec<ShopRow> = sqlx::query_as(&format!(
            r"
            SELECT {SHOP_COLUMNS} FROM shops
            WHERE ($1::INT IS NULL OR area_id = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(area_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// All shops in an area, by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_area(&self, area_id: AreaId) -> Result<Vec<Shop>, RepositoryError> {
        let rows: Vec<ShopRow> = sqlx::query_as(&format!(
            "SELECT {SHOP_COLUMNS} FROM shops WHERE area_id = $1 ORDER BY id"
        ))
        .bind(area_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Shops a user has favorited, newest favorite first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_favorited_by(&self, user_id: UserId) -> Result<Vec<Shop>, RepositoryError> {
        let rows: Vec<ShopRow> = sqlx::query_as(
            r"
            SELECT s.id, s.area_id, s.shop_name, s.shop_detail, s.image_path, s.homepage_url,
                   s.address, s.phone, s.created_at, s.updated_at
            FROM shops s
            JOIN favorites f ON f.shop_id = s.id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC, s.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ShopId) -> Result<Option<Shop>, RepositoryError> {
        let row: Option<ShopRow> =
            sqlx::query_as(&format!("SELECT {SHOP_COLUMNS} FROM shops WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the area does not exist.
    pub async fn create(&self, new: &NewShop) -> Result<Shop, RepositoryError> {
        let row: ShopRow = sqlx::query_as(&format!(
            r"
            INSERT INTO shops
                (area_id, shop_name, shop_detail, image_path, homepage_url, address, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SHOP_COLUMNS}
            "
        ))
        .bind(new.area_id)
        .bind(&new.shop_name)
        .bind(&new.shop_detail)
        .bind(&new.image_path)
        .bind(&new.homepage_url)
        .bind(&new.address)
        .bind(&new.phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "Area"))?;
        Ok(row.into())
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop (or a new area) does not exist.
    pub async fn update(&self, id: ShopId, changes: &ShopChanges) -> Result<Shop, RepositoryError> {
        let row: Option<ShopRow> = sqlx::query_as(&format!(
            r"
            UPDATE shops SET
                area_id = COALESCE($2, area_id),
                shop_name = COALESCE($3, shop_name),
                shop_detail = COALESCE($4, shop_detail),
                image_path = COALESCE($5, image_path),
                homepage_url = COALESCE($6, homepage_url),
                address = COALESCE($7, address),
                phone = COALESCE($8, phone),
                updated_at = now()
            WHERE id = $1
            RETURNING {SHOP_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.area_id)
        .bind(&changes.shop_name)
        .bind(&changes.shop_detail)
        .bind(&changes.image_path)
        .bind(&changes.homepage_url)
        .bind(&changes.address)
        .bind(&changes.phone)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "Area"))?;

        row.map(Into::into).ok_or(RepositoryError::NotFound("Shop"))
    }

    /// Delete a shop. Menus, shop users and favorites cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ShopId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shops WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
