//! Menu handlers.
//!
//! Reads are public. Writes require a shop user of the menu's shop.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use menuhub_core::MenuId;

use super::MessageResponse;
use crate::db::MenuRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireShopUser, ensure_same_shop};
use crate::models::{Menu, MenuChanges, MenuFilter, NewMenu, Page};
use crate::services::notifications::announce_new_menu;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{menu_id}", get(show).put(update).delete(destroy))
}

/// List menus with filters and pagination.
///
/// `total` counts every match, not just the returned page.
async fn index(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<MenuFilter>,
) -> Result<Json<Page<Menu>>> {
    let pagination = filter.pagination();
    pagination.validate()?;

    let (menus, total) = MenuRepository::new(state.pool()).list(&filter).await?;
    Ok(Json(Page::new(menus, total, pagination)))
}

/// Get one menu. Also mounted at `/menu/{menu_id}`.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(menu_id): ApiPath<MenuId>,
) -> Result<Json<Menu>> {
    find_menu(&state, menu_id).await.map(Json)
}

/// Create a menu for the caller's shop and notify the shop's followers.
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiJson(payload): ApiJson<NewMenu>,
) -> Result<(StatusCode, Json<Menu>)> {
    payload.validate()?;
    let shop_id = payload.shop_id.unwrap_or(shop_user.shop_id);
    ensure_same_shop(&shop_user, shop_id)?;

    let menu = MenuRepository::new(state.pool())
        .create(shop_id, &payload)
        .await?;

    let menu_id = menu.id.to_string();
    add_breadcrumb("menu", "Created menu", Some(&[("menu_id", &menu_id)]));
    tracing::info!(menu_id = %menu.id, shop_id = %shop_id, "Menu created");

    announce_new_menu(state.pool(), &shop_user, &menu).await;
    Ok((StatusCode::CREATED, Json(menu)))
}

#[instrument(skip_all)]
async fn update(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiPath(menu_id): ApiPath<MenuId>,
    ApiJson(changes): ApiJson<MenuChanges>,
) -> Result<Json<Menu>> {
    let existing = find_menu(&state, menu_id).await?;
    ensure_same_shop(&shop_user, existing.shop_id)?;
    changes.validate()?;

    let menu = MenuRepository::new(state.pool())
        .update(menu_id, &changes)
        .await?;
    Ok(Json(menu))
}

#[instrument(skip_all)]
async fn destroy(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiPath(menu_id): ApiPath<MenuId>,
) -> Result<Json<MessageResponse>> {
    let existing = find_menu(&state, menu_id).await?;
    ensure_same_shop(&shop_user, existing.shop_id)?;

    if !MenuRepository::new(state.pool()).delete(menu_id).await? {
        return Err(AppError::NotFound("Menu not found".to_owned()));
    }
    tracing::info!(menu_id = %menu_id, "Menu deleted");
    Ok(Json(MessageResponse::new("Menu deleted successfully")))
}

async fn find_menu(state: &AppState, menu_id: MenuId) -> Result<Menu> {
    MenuRepository::new(state.pool())
        .get_by_id(menu_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu not found".to_owned()))
}
