//! Registration, login and current-account handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use menuhub_core::{AccountKind, Email};

use crate::db::identities;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::{RateLimiterLayer, RequireShopUser, RequireUser};
use crate::models::{AccountChanges, NewShopUser, NewUser, Principal, ShopUser, User};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// User login payload.
#[derive(Deserialize)]
pub struct UserLogin {
    pub email: Email,
    pub password: String,
}

/// Shop user login payload.
#[derive(Deserialize)]
pub struct ShopUserLogin {
    pub username: String,
    pub password: String,
}

/// Issued access token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user_type: AccountKind,
}

#[derive(Debug, Serialize)]
pub struct UsernameAvailability {
    pub available: bool,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct EmailAvailability {
    pub available: bool,
    pub email: String,
}

/// `limiter` is shared with every other registration route.
pub fn router(limiter: RateLimiterLayer) -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(register))
        .route("/shop/register", post(register_shop_user))
        .route("/login", post(login))
        .route("/shop/login", post(shop_login))
        .layer(limiter);

    Router::new()
        .merge(limited)
        .route("/me", get(me).put(update_me))
        .route("/shop/me", get(shop_me))
        .route("/check-username/{username}", get(check_username))
        .route("/check-email/{email}", get(check_email))
}

/// Register a general user.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    payload.validate()?;
    let user = state.auth().register_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Register a shop user for an existing shop.
#[instrument(skip_all)]
pub async fn register_shop_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<NewShopUser>,
) -> Result<(StatusCode, Json<ShopUser>)> {
    payload.validate()?;
    let shop_user = state.auth().register_shop_user(&payload).await?;
    Ok((StatusCode::CREATED, Json(shop_user)))
}

#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserLogin>,
) -> Result<Json<TokenResponse>> {
    let auth = state.auth();
    let user = auth
        .authenticate_user(&payload.email, &payload.password)
        .await
        .inspect_err(|_| tracing::info!(domain = payload.email.domain(), "User login failed"))?;

    token_response(&auth, Principal::User(user))
}

#[instrument(skip_all)]
async fn shop_login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ShopUserLogin>,
) -> Result<Json<TokenResponse>> {
    let auth = state.auth();
    let shop_user = auth
        .authenticate_shop_user(&payload.username, &payload.password)
        .await
        .inspect_err(|_| tracing::info!("Shop user login failed"))?;

    token_response(&auth, Principal::ShopUser(shop_user))
}

fn token_response(
    auth: &AuthService<'_>,
    principal: Principal,
) -> Result<Json<TokenResponse>> {
    let access_token = auth.issue_token(&principal)?;
    tracing::info!(
        username = %principal.username(),
        user_type = principal.kind().as_str(),
        "Issued access token"
    );

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
        user_type: principal.kind(),
    }))
}

async fn me(RequireUser(user): RequireUser) -> Json<User> {
    Json(user)
}

#[instrument(skip_all)]
async fn update_me(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ApiJson(changes): ApiJson<AccountChanges>,
) -> Result<Json<User>> {
    changes.validate()?;
    let updated = state.auth().update_user(user.id, &changes).await?;
    Ok(Json(updated))
}

async fn shop_me(RequireShopUser(shop_user): RequireShopUser) -> Json<ShopUser> {
    Json(shop_user)
}

async fn check_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<UsernameAvailability>> {
    let taken = identities::username_exists(state.pool(), &username).await?;
    Ok(Json(UsernameAvailability {
        available: !taken,
        username,
    }))
}

async fn check_email(
    State(state): State<AppState>,
    ApiPath(email): ApiPath<String>,
) -> Result<Json<EmailAvailability>> {
    let taken = identities::email_exists(state.pool(), &email).await?;
    Ok(Json(EmailAvailability {
        available: !taken,
        email,
    }))
}
