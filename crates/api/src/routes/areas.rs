//! Area handlers.

use std::collections::HashMap;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::instrument;

use menuhub_core::{AreaId, ShopId};

use super::MessageResponse;
use crate::db::{AreaRepository, MenuRepository, ShopRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireShopUser;
use crate::models::{Area, AreaInput, Menu, Shop};
use crate::state::AppState;

/// Menus of one shop in an area.
#[derive(Debug, Serialize)]
pub struct ShopMenus {
    pub shop_id: ShopId,
    pub shop_name: String,
    pub menus: Vec<Menu>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{area_id}", get(show).put(update).delete(destroy))
        .route("/{area_id}/menus", get(menus))
}

async fn index(State(state): State<AppState>) -> Result<Json<Vec<Area>>> {
    let areas = AreaRepository::new(state.pool()).list().await?;
    Ok(Json(areas))
}

async fn show(
    State(state): State<AppState>,
    ApiPath(area_id): ApiPath<AreaId>,
) -> Result<Json<Area>> {
    find_area(&state, area_id).await.map(Json)
}

#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    RequireShopUser(_): RequireShopUser,
    ApiJson(payload): ApiJson<AreaInput>,
) -> Result<(StatusCode, Json<Area>)> {
    payload.validate()?;
    let area = AreaRepository::new(state.pool()).create(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(area)))
}

#[instrument(skip_all)]
async fn update(
    State(state): State<AppState>,
    RequireShopUser(_): RequireShopUser,
    ApiPath(area_id): ApiPath<AreaId>,
    ApiJson(payload): ApiJson<AreaInput>,
) -> Result<Json<Area>> {
    payload.validate()?;
    let area = AreaRepository::new(state.pool())
        .update(area_id, &payload.name)
        .await?;
    Ok(Json(area))
}

#[instrument(skip_all)]
async fn destroy(
    State(state): State<AppState>,
    RequireShopUser(_): RequireShopUser,
    ApiPath(area_id): ApiPath<AreaId>,
) -> Result<Json<MessageResponse>> {
    if !AreaRepository::new(state.pool()).delete(area_id).await? {
        return Err(AppError::NotFound("Area not found".to_owned()));
    }
    tracing::info!(area_id = %area_id, "Area deleted");
    Ok(Json(MessageResponse::new("Area deleted successfully")))
}

/// Every shop in the area with its menus. Shops without menus are included.
async fn menus(
    State(state): State<AppState>,
    ApiPath(area_id): ApiPath<AreaId>,
) -> Result<Json<Vec<ShopMenus>>> {
    find_area(&state, area_id).await?;

    let shops = ShopRepository::new(state.pool())
        .list_by_area(area_id)
        .await?;
    let shop_ids: Vec<ShopId> = shops.iter().map(|shop| shop.id).collect();
    let menus = MenuRepository::new(state.pool())
        .list_by_shops(&shop_ids)
        .await?;

    Ok(Json(group_by_shop(shops, menus)))
}

async fn find_area(state: &AppState, area_id: AreaId) -> Result<Area> {
    AreaRepository::new(state.pool())
        .get_by_id(area_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Area not found".to_owned()))
}

/// Attach each menu to its shop, keeping the shop order.
fn group_by_shop(shops: Vec<Shop>, menus: Vec<Menu>) -> Vec<ShopMenus> {
    let mut by_shop: HashMap<ShopId, Vec<Menu>> = HashMap::new();
    for menu in menus {
        by_shop.entry(menu.shop_id).or_default().push(menu);
    }

    shops
        .into_iter()
        .map(|shop| ShopMenus {
            menus: by_shop.remove(&shop.id).unwrap_or_default(),
            shop_id: shop.id,
            shop_name: shop.shop_name,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use menuhub_core::{MenuId, Price};
    use rust_decimal::Decimal;

    use super::*;

    fn shop(id: i32, name: &str) -> Shop {
        Shop {
            id: ShopId::new(id),
            area_id: AreaId::new(1),
            shop_name: name.to_owned(),
            shop_detail: None,
            image_path: None,
            homepage_url: None,
            address: None,
            phone: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn menu(id: i32, shop_id: i32) -> Menu {
        Menu {
            id: MenuId::new(id),
            shop_id: ShopId::new(shop_id),
            genre_id: None,
            name: format!("Menu {id}"),
            description: None,
            price: Price::new(Decimal::new(980, 0)).unwrap(),
            category: None,
            tags: Vec::new(),
            image_url: None,
            is_available: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_group_by_shop_keeps_shop_order_and_empty_shops() {
        let grouped = group_by_shop(
            vec![shop(2, "Ramen Ichi"), shop(1, "Sushi Taro"), shop(3, "Empty")],
            vec![menu(10, 1), menu(11, 2), menu(12, 1)],
        );

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].shop_name, "Ramen Ichi");
        assert_eq!(grouped[0].menus.len(), 1);
        assert_eq!(grouped[1].shop_id, ShopId::new(1));
        assert_eq!(
            grouped[1].menus.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![MenuId::new(10), MenuId::new(12)]
        );
        assert!(grouped[2].menus.is_empty());
    }
}
