//! Menu favorite handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use menuhub_core::{MenuId, UserId};

use super::MessageResponse;
use super::favorites::FavoriteStatus;
use crate::db::MenuFavoriteRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireUser, ensure_same_user};
use crate::models::MenuFavorite;
use crate::state::AppState;

/// Identifies one user/menu pair, as a body or a query string.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MenuFavoriteKey {
    pub user_id: UserId,
    pub menu_id: MenuId,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add).delete(remove))
        .route("/user/{user_id}", get(index))
        .route("/check", get(check))
}

#[instrument(skip_all)]
async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(key): ApiJson<MenuFavoriteKey>,
) -> Result<(StatusCode, Json<MenuFavorite>)> {
    ensure_same_user(&user, key.user_id)?;
    let (favorite, created) = MenuFavoriteRepository::new(state.pool())
        .add(key.user_id, key.menu_id)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(favorite)))
}

#[instrument(skip_all)]
async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiQuery(key): ApiQuery<MenuFavoriteKey>,
) -> Result<Json<MessageResponse>> {
    ensure_same_user(&user, key.user_id)?;
    if !MenuFavoriteRepository::new(state.pool())
        .remove(key.user_id, key.menu_id)
        .await?
    {
        return Err(AppError::NotFound("Menu favorite not found".to_owned()));
    }
    Ok(Json(MessageResponse::new("Removed from favorites")))
}

async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<MenuFavorite>>> {
    ensure_same_user(&user, user_id)?;
    let favorites = MenuFavoriteRepository::new(state.pool())
        .list_by_user(user_id)
        .await?;
    Ok(Json(favorites))
}

async fn check(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiQuery(key): ApiQuery<MenuFavoriteKey>,
) -> Result<Json<FavoriteStatus>> {
    ensure_same_user(&user, key.user_id)?;
    let is_favorite = MenuFavoriteRepository::new(state.pool())
        .exists(key.user_id, key.menu_id)
        .await?;
    Ok(Json(FavoriteStatus { is_favorite }))
}
