//! Menu repository.
//!
//! Listing builds its `WHERE` clause dynamically with `sqlx::QueryBuilder`
//! so the count and page queries always share the same filters.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use menuhub_core::{GenreId, MenuId, Price, ShopId};

use super::{RepositoryError, map_fk_violation};
use crate::models::{Menu, MenuChanges, MenuFilter, NewMenu};

#[derive(Debug, sqlx::FromRow)]
struct MenuRow {
    id: i32,
    shop_id: i32,
    genre_id: Option<i32>,
    name: String,
    description: Option<String>,
    price: Decimal,
    category: Option<String>,
    tags: Vec<String>,
    image_url: Option<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<MenuRow> for Menu {
    type Error = RepositoryError;

    fn try_from(row: MenuRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for menu {}: {e}", row.id))
        })?;

        Ok(Self {
            id: MenuId::new(row.id),
            shop_id: ShopId::new(row.shop_id),
            genre_id: row.genre_id.map(GenreId::new),
            name: row.name,
            description: row.description,
            price,
            category: row.category,
            tags: row.tags,
            image_url: row.image_url,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const MENU_COLUMNS: &str = "id, shop_id, genre_id, name, description, price, category, tags, \
                            image_url, is_available, created_at, updated_at";

/// Append the `WHERE` clause for `filter`.
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &MenuFilter) {
    qb.push(" WHERE TRUE");

    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(pattern) = filter.search_pattern() {
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if filter.available_only {
        qb.push(" AND is_available");
    }
    if let Some(shop_id) = filter.shop_id {
        qb.push(" AND shop_id = ").push_bind(shop_id);
    }
    if let Some(genre_id) = filter.genre_id {
        qb.push(" AND genre_id = ").push_bind(genre_id);
    }
    if let Some(tag) = &filter.tag {
        qb.push(" AND ").push_bind(tag.clone()).push(" = ANY(tags)");
    }
}

/// Repository for menu database operations.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List one page of menus matching `filter`.
    ///
    /// Returns the page and the total number of matches ignoring the page
    /// window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &MenuFilter) -> Result<(Vec<Menu>, i64), RepositoryError> {
        let pagination = filter.pagination();

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM menus");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {MENU_COLUMNS} FROM menus"));
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY id LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<MenuRow> = select.build_query_as().fetch_all(self.pool).await?;
        let menus = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((menus, total))
    }

    /// All menus of the given shops, ordered by shop then ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_shops(&self, shop_ids: &[ShopId]) -> Result<Vec<Menu>, RepositoryError> {
        let ids: Vec<i32> = shop_ids.iter().map(ShopId::as_i32).collect();
        let rows: Vec<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE shop_id = ANY($1) ORDER BY shop_id, id"
        ))
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// All menus filed under a genre.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_genre(&self, genre_id: GenreId) -> Result<Vec<Menu>, RepositoryError> {
        let rows: Vec<MenuRow> = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menus WHERE genre_id = $1 ORDER BY id"
        ))
        .bind(genre_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: MenuId) -> Result<Option<Menu>, RepositoryError> {
        let row: Option<MenuRow> =
            sqlx::query_as(&format!("SELECT {MENU_COLUMNS} FROM menus WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a menu for `shop_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the shop or genre does not exist.
    pub async fn create(&self, shop_id: ShopId, new: &NewMenu) -> Result<Menu, RepositoryError> {
        let row: MenuRow = sqlx::query_as(&format!(
            r"
            INSERT INTO menus
                (shop_id, genre_id, name, description, price, category, tags, image_url, is_available)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {MENU_COLUMNS}
            "
        ))
        .bind(shop_id)
        .bind(new.genre_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.category)
        .bind(&new.tags)
        .bind(&new.image_url)
        .bind(new.is_available)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "Shop or genre"))?;

        row.try_into()
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the menu (or a new genre) does not exist.
    pub async fn update(&self, id: MenuId, changes: &MenuChanges) -> Result<Menu, RepositoryError> {
        let row: Option<MenuRow> = sqlx::query_as(&format!(
            r"
            UPDATE menus SET
                genre_id = COALESCE($2, genre_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                price = COALESCE($5, price),
                category = COALESCE($6, category),
                tags = COALESCE($7, tags),
                image_url = COALESCE($8, image_url),
                is_available = COALESCE($9, is_available),
                updated_at = now()
            WHERE id = $1
            RETURNING {MENU_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.genre_id)
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(&changes.category)
        .bind(&changes.tags)
        .bind(&changes.image_url)
        .bind(changes.is_available)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_fk_violation(e, "Genre"))?;

        row.ok_or(RepositoryError::NotFound("Menu"))?.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: MenuId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
