//! Genre repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use menuhub_core::GenreId;

use super::RepositoryError;
use crate::models::Genre;

#[derive(Debug, sqlx::FromRow)]
struct GenreRow {
    id: i32,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<GenreRow> for Genre {
    fn from(row: GenreRow) -> Self {
        Self {
            id: GenreId::new(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Repository for genre database operations.
pub struct GenreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GenreRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Genre>, RepositoryError> {
        let rows: Vec<GenreRow> =
            sqlx::query_as("SELECT id, name, created_at FROM genres ORDER BY id")
                .fetch_all(self.pool)
                .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: GenreId) -> Result<Option<Genre>, RepositoryError> {
        let row: Option<GenreRow> =
            sqlx::query_as("SELECT id, name, created_at FROM genres WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, name: &str) -> Result<Genre, RepositoryError> {
        let row: GenreRow = sqlx::query_as(
            "INSERT INTO genres (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }
}
