//! `/notification-shop` and `/notification-users` join-row handlers.
//!
//! Reads are public. Creating a link requires a shop user whose shop sent the
//! notification.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;
use tracing::instrument;

use menuhub_core::{NotificationId, NotificationShopId, NotificationUserId, ShopId, UserId};

use crate::db::{NotificationLinkRepository, NotificationRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{RequireShopUser, ensure_same_shop};
use crate::models::{NotificationShop, NotificationUser, ShopUser, ValidationError};
use crate::state::AppState;

const MAX_LIMIT: i64 = 100;

/// `skip`/`limit` window for link listings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinkWindow {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_limit() -> i64 {
    MAX_LIMIT
}

impl LinkWindow {
    fn validate(self) -> std::result::Result<Self, ValidationError> {
        if self.skip < 0 {
            return Err(ValidationError("skip must not be negative".to_owned()));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(ValidationError(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewShopLink {
    pub notification_id: NotificationId,
    pub shop_id: ShopId,
}

#[derive(Debug, Deserialize)]
pub struct NewUserLink {
    pub notification_id: NotificationId,
    pub user_id: UserId,
}

pub fn shop_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shop_links).post(create_shop_link))
        .route("/{link_id}", get(show_shop_link))
}

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_user_links).post(create_user_link))
        .route("/{link_id}", get(show_user_link))
}

#[instrument(skip_all)]
async fn create_shop_link(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiJson(payload): ApiJson<NewShopLink>,
) -> Result<(StatusCode, Json<NotificationShop>)> {
    ensure_same_shop(&shop_user, payload.shop_id)?;
    ensure_sender(&state, &shop_user, payload.notification_id).await?;

    let link = NotificationLinkRepository::new(state.pool())
        .create_shop_link(payload.notification_id, payload.shop_id)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn list_shop_links(
    State(state): State<AppState>,
    ApiQuery(window): ApiQuery<LinkWindow>,
) -> Result<Json<Vec<NotificationShop>>> {
    let window = window.validate()?;
    let links = NotificationLinkRepository::new(state.pool())
        .list_shop_links(window.skip, window.limit)
        .await?;
    Ok(Json(links))
}

async fn show_shop_link(
    State(state): State<AppState>,
    ApiPath(link_id): ApiPath<NotificationShopId>,
) -> Result<Json<NotificationShop>> {
    NotificationLinkRepository::new(state.pool())
        .get_shop_link(link_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Notification shop link not found".to_owned()))
}

#[instrument(skip_all)]
async fn create_user_link(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiJson(payload): ApiJson<NewUserLink>,
) -> Result<(StatusCode, Json<NotificationUser>)> {
    ensure_sender(&state, &shop_user, payload.notification_id).await?;

    let link = NotificationLinkRepository::new(state.pool())
        .create_user_link(payload.notification_id, payload.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn list_user_links(
    State(state): State<AppState>,
    ApiQuery(window): ApiQuery<LinkWindow>,
) -> Result<Json<Vec<NotificationUser>>> {
    let window = window.validate()?;
    let links = NotificationLinkRepository::new(state.pool())
        .list_user_links(window.skip, window.limit)
        .await?;
    Ok(Json(links))
}

async fn show_user_link(
    State(state): State<AppState>,
    ApiPath(link_id): ApiPath<NotificationUserId>,
) -> Result<Json<NotificationUser>> {
    NotificationLinkRepository::new(state.pool())
        .get_user_link(link_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Notification user link not found".to_owned()))
}

/// Fail unless the notification exists and was sent from `shop_user`'s shop.
async fn ensure_sender(
    state: &AppState,
    shop_user: &ShopUser,
    notification_id: NotificationId,
) -> Result<()> {
    let notification = NotificationRepository::new(state.pool())
        .get(notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_owned()))?;

    match notification.shop_id {
        Some(shop_id) => ensure_same_shop(shop_user, shop_id),
        None => Err(AppError::Forbidden(
            "Notification was not sent by a shop".to_owned(),
        )),
    }
}
