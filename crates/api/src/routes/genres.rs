//! Genre handlers.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::instrument;

use menuhub_core::GenreId;

use crate::db::{GenreRepository, MenuRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireShopUser;
use crate::models::{Genre, GenreInput, Menu};
use crate::state::AppState;

/// Menus filed under one genre.
#[derive(Debug, Serialize)]
pub struct GenreMenus {
    pub genre: String,
    pub menus: Vec<Menu>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{genre_id}", get(show))
        .route("/{genre_id}/menus", get(menus))
}

async fn index(State(state): State<AppState>) -> Result<Json<Vec<Genre>>> {
    let genres = GenreRepository::new(state.pool()).list().await?;
    Ok(Json(genres))
}

async fn show(
    State(state): State<AppState>,
    ApiPath(genre_id): ApiPath<GenreId>,
) -> Result<Json<Genre>> {
    find_genre(&state, genre_id).await.map(Json)
}

#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    RequireShopUser(_): RequireShopUser,
    ApiJson(payload): ApiJson<GenreInput>,
) -> Result<(StatusCode, Json<Genre>)> {
    payload.validate()?;
    let genre = GenreRepository::new(state.pool())
        .create(&payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

async fn menus(
    State(state): State<AppState>,
    ApiPath(genre_id): ApiPath<GenreId>,
) -> Result<Json<GenreMenus>> {
    let genre = find_genre(&state, genre_id).await?;
    let menus = MenuRepository::new(state.pool())
        .list_by_genre(genre_id)
        .await?;
    Ok(Json(GenreMenus {
        genre: genre.name,
        menus,
    }))
}

async fn find_genre(state: &AppState, genre_id: GenreId) -> Result<Genre> {
    GenreRepository::new(state.pool())
        .get_by_id(genre_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Genre not found".to_owned()))
}
