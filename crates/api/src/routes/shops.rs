//! Shop handlers.
//!
//! Creating a shop is public because a shop must exist before its owner can
//! register. Updates and deletes require a shop user of that shop.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tracing::instrument;

use menuhub_core::{AreaId, ShopId};

use super::MessageResponse;
use crate::db::ShopRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireShopUser, ensure_same_shop};
use crate::models::{NewShop, Page, Pagination, Shop, ShopChanges};
use crate::state::AppState;

/// Query string for `GET /shops`.
#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub area_id: Option<AreaId>,
    #[serde(default = "Pagination::default_page")]
    pub page: u32,
    #[serde(default = "Pagination::default_per_page")]
    pub per_page: u32,
}

impl ShopQuery {
    const fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{shop_id}", get(show).put(update).delete(destroy))
}

async fn index(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ShopQuery>,
) -> Result<Json<Page<Shop>>> {
    let pagination = query.pagination();
    pagination.validate()?;

    let (shops, total) = ShopRepository::new(state.pool())
        .list(query.area_id, pagination)
        .await?;
    Ok(Json(Page::new(shops, total, pagination)))
}

async fn show(
    State(state): State<AppState>,
    ApiPath(shop_id): ApiPath<ShopId>,
) -> Result<Json<Shop>> {
    ShopRepository::new(state.pool())
        .get_by_id(shop_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Shop not found".to_owned()))
}

#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewShop>,
) -> Result<(StatusCode, Json<Shop>)> {
    payload.validate()?;
    let shop = ShopRepository::new(state.pool()).create(&payload).await?;
    tracing::info!(shop_id = %shop.id, area_id = %shop.area_id, "Shop created");
    Ok((StatusCode::CREATED, Json(shop)))
}

#[instrument(skip_all)]
async fn update(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiPath(shop_id): ApiPath<ShopId>,
    ApiJson(changes): ApiJson<ShopChanges>,
) -> Result<Json<Shop>> {
    ensure_same_shop(&shop_user, shop_id)?;
    changes.validate()?;
    let shop = ShopRepository::new(state.pool())
        .update(shop_id, &changes)
        .await?;
    Ok(Json(shop))
}

#[instrument(skip_all)]
async fn destroy(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiPath(shop_id): ApiPath<ShopId>,
) -> Result<Json<MessageResponse>> {
    ensure_same_shop(&shop_user, shop_id)?;
    if !ShopRepository::new(state.pool()).delete(shop_id).await? {
        return Err(AppError::NotFound("Shop not found".to_owned()));
    }
    tracing::info!(shop_id = %shop_id, "Shop deleted");
    Ok(Json(MessageResponse::new("Shop deleted successfully")))
}
