//! Area repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use menuhub_core::AreaId;

use super::RepositoryError;
use crate::models::Area;

#[derive(Debug, sqlx::FromRow)]
struct AreaRow {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<AreaRow> for Area {
    fn from(row: AreaRow) -> Self {
        Self {
            id: AreaId::new(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Repository for area database operations.
pub struct AreaRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AreaRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all areas by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Area>, RepositoryError> {
        let rows: Vec<AreaRow> =
            sqlx::query_as("SELECT id, name, created_at FROM areas ORDER BY id")
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AreaId) -> Result<Option<Area>, RepositoryError> {
        let row: Option<AreaRow> =
            sqlx::query_as("SELECT id, name, created_at FROM areas WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, name: &str) -> Result<Area, RepositoryError> {
        let row: AreaRow =
            sqlx::query_as("INSERT INTO areas (name) VALUES ($1) RETURNING id, name, created_at")
                .bind(name)
                .fetch_one(self.pool)
                .await?;
        Ok(row.into())
    }

    /// Rename an area.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the area does not exist.
    pub async fn update(&self, id: AreaId, name: &str) -> Result<Area, RepositoryError> {
        let row: Option<AreaRow> = sqlx::query_as(
            "UPDATE areas SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;
        row.map(Into::into).ok_or(RepositoryError::NotFound("Area"))
    }

    /// Delete an area.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` while shops still belong to the area.
    pub async fn delete(&self, id: AreaId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM areas WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "Area still has shops and cannot be deleted".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
