//! Notification handlers.
//!
//! Shop users create and broadcast notifications. Users read and manage the
//! ones addressed to them.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use menuhub_core::{NotificationId, UserId};

use super::MessageResponse;
use crate::db::NotificationRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{RequireShopUser, RequireUser, ensure_same_user};
use crate::models::notification::validate_contents;
use crate::models::{NewNotification, Notification, User};
use crate::services::notifications::broadcast;
use crate::state::AppState;

/// Body of `POST /notifications`.
#[derive(Debug, Deserialize)]
pub struct CreateNotification {
    pub user_id: UserId,
    pub contents: String,
}

/// Body of `POST /notifications/broadcast`.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub contents: String,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub unread_count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub updated: u64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/broadcast", post(broadcast_to_followers))
        .route("/user/{user_id}", get(index))
        .route("/user/{user_id}/unread-count", get(unread_count))
        .route("/user/{user_id}/read-all", put(read_all))
        .route("/read/{notification_id}", put(read))
        .route("/{notification_id}", get(show).delete(destroy))
}

/// Send one notification from the caller's shop to a user.
#[instrument(skip_all)]
async fn create(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiJson(payload): ApiJson<CreateNotification>,
) -> Result<(StatusCode, Json<Notification>)> {
    let new = NewNotification {
        user_id: payload.user_id,
        shop_id: Some(shop_user.shop_id),
        shop_user_id: Some(shop_user.id),
        contents: payload.contents,
    };
    new.validate()?;

    let notification = NotificationRepository::new(state.pool()).create(&new).await?;
    tracing::info!(
        notification_id = %notification.id,
        shop_id = %shop_user.shop_id,
        "Notification created"
    );
    Ok((StatusCode::CREATED, Json(notification)))
}

/// Notify everyone who favorited the caller's shop.
#[instrument(skip_all)]
async fn broadcast_to_followers(
    State(state): State<AppState>,
    RequireShopUser(shop_user): RequireShopUser,
    ApiJson(payload): ApiJson<BroadcastRequest>,
) -> Result<(StatusCode, Json<Vec<Notification>>)> {
    validate_contents(&payload.contents)?;
    let notifications = broadcast(state.pool(), &shop_user, &payload.contents).await?;
    Ok((StatusCode::CREATED, Json(notifications)))
}

async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<Vec<Notification>>> {
    ensure_same_user(&user, user_id)?;
    let notifications = NotificationRepository::new(state.pool())
        .list_by_user(user_id)
        .await?;
    Ok(Json(notifications))
}

async fn unread_count(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<UnreadCount>> {
    ensure_same_user(&user, user_id)?;
    let unread_count = NotificationRepository::new(state.pool())
        .unread_count(user_id)
        .await?;
    Ok(Json(UnreadCount { unread_count }))
}

#[instrument(skip_all)]
async fn read_all(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<MarkedRead>> {
    ensure_same_user(&user, user_id)?;
    let updated = NotificationRepository::new(state.pool())
        .mark_all_read(user_id)
        .await?;
    Ok(Json(MarkedRead { updated }))
}

async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(notification_id): ApiPath<NotificationId>,
) -> Result<Json<Notification>> {
    find_own(&state, &user, notification_id).await.map(Json)
}

/// Mark one notification read. Marking it again is a no-op.
#[instrument(skip_all)]
async fn read(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(notification_id): ApiPath<NotificationId>,
) -> Result<Json<Notification>> {
    find_own(&state, &user, notification_id).await?;
    let notification = NotificationRepository::new(state.pool())
        .mark_read(notification_id)
        .await?;
    Ok(Json(notification))
}

#[instrument(skip_all)]
async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(notification_id): ApiPath<NotificationId>,
) -> Result<Json<MessageResponse>> {
    find_own(&state, &user, notification_id).await?;
    if !NotificationRepository::new(state.pool())
        .delete(notification_id)
        .await?
    {
        return Err(AppError::NotFound("Notification not found".to_owned()));
    }
    Ok(Json(MessageResponse::new("Notification deleted successfully")))
}

/// Load a notification and check that `user` is its recipient.
async fn find_own(
    state: &AppState,
    user: &User,
    notification_id: NotificationId,
) -> Result<Notification> {
    let notification = NotificationRepository::new(state.pool())
        .get(notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_owned()))?;
    ensure_same_user(user, notification.user_id)?;
    Ok(notification)
}
