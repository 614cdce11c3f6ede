//! User profile handlers.

use axum::{Json, Router, extract::State, routing::get};

use menuhub_core::UserId;

use super::MessageResponse;
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{RateLimiterLayer, RequireUser, ensure_same_user};
use crate::models::{AccountChanges, User};
use crate::state::AppState;

pub fn router(limiter: RateLimiterLayer) -> Router<AppState> {
    let register = Router::new()
        .route("/", axum::routing::post(super::auth::register))
        .layer(limiter);

    Router::new()
        .merge(register)
        .route("/{user_id}", get(show).put(update).delete(destroy))
}

async fn show(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))
}

async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(changes): ApiJson<AccountChanges>,
) -> Result<Json<User>> {
    ensure_same_user(&user, user_id)?;
    changes.validate()?;
    let updated = state.auth().update_user(user_id, &changes).await?;
    Ok(Json(updated))
}

async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Json<MessageResponse>> {
    ensure_same_user(&user, user_id)?;
    if !UserRepository::new(state.pool()).delete(user_id).await? {
        return Err(AppError::NotFound("User not found".to_owned()));
    }
    tracing::info!(user_id = %user_id, "User deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
