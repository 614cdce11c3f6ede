//! Shop favorite handlers. Every route is scoped to the calling user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tracing::instrument;

use menuhub_core::{ShopId, UserId};

use super::MessageResponse;
use crate::db::FavoriteRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiPath;
use crate::middleware::{RequireUser, ensure_same_user};
use crate::models::{Favorite, Shop};
use crate::state::AppState;

/// Whether a user has favorited a shop or menu.
#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub is_favorite: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}", get(index))
        .route("/users/{user_id}/shops", get(shops))
        .route("/users/{user_id}/shops/{shop_id}", post(add).delete(remove))
        .route("/users/{user_id}/shops/{shop_id}/status", get(status))
}

async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<Favorite>>> {
    ensure_same_user(&user, user_id)?;
    let favorites = FavoriteRepository::new(state.pool())
        .list_by_user(user_id)
        .await?;
    Ok(Json(favorites))
}

async fn shops(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<Shop>>> {
    ensure_same_user(&user, user_id)?;
    let shops = FavoriteRepository::new(state.pool())
        .list_shops(user_id)
        .await?;
    Ok(Json(shops))
}

/// Add a favorite. Repeating the call returns the existing row with 200.
#[instrument(skip_all)]
async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath((user_id, shop_id)): ApiPath<(UserId, ShopId)>,
) -> Result<(StatusCode, Json<Favorite>)> {
    ensure_same_user(&user, user_id)?;
    let (favorite, created) = FavoriteRepository::new(state.pool())
        .add(user_id, shop_id)
        .await?;

    if !created {
        return Ok((StatusCode::OK, Json(favorite)));
    }
    let shop_id_str = shop_id.to_string();
    add_breadcrumb("favorite", "Added shop favorite", Some(&[("shop_id", &shop_id_str)]));
    Ok((StatusCode::CREATED, Json(favorite)))
}

#[instrument(skip_all)]
async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath((user_id, shop_id)): ApiPath<(UserId, ShopId)>,
) -> Result<Json<MessageResponse>> {
    ensure_same_user(&user, user_id)?;
    if !FavoriteRepository::new(state.pool())
        .remove(user_id, shop_id)
        .await?
    {
        return Err(AppError::NotFound("Favorite not found".to_owned()));
    }
    Ok(Json(MessageResponse::new("Favorite removed successfully")))
}

async fn status(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath((user_id, shop_id)): ApiPath<(UserId, ShopId)>,
) -> Result<Json<FavoriteStatus>> {
    ensure_same_user(&user, user_id)?;
    let favorite = FavoriteRepository::new(state.pool())
        .get(user_id, shop_id)
        .await?;
    Ok(Json(FavoriteStatus {
        is_favorite: favorite.is_some(),
    }))
}
