//! Bearer authentication extractors.
//!
//! Each extractor reads `Authorization: Bearer <token>`, resolves it through
//! [`AuthService`](crate::services::auth::AuthService) and rejects with
//! `401 Unauthorized` (plus `WWW-Authenticate: Bearer`) when the header is
//! missing, the token does not verify, or the token is of the wrong kind.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn me(RequireUser(user): RequireUser) -> Json<User> {
//!     Json(user)
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use menuhub_core::{AccountKind, ShopId, UserId};

use crate::error::{AppError, set_sentry_user};
use crate::models::{Principal, ShopUser, User};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Extractor that requires a general user token.
pub struct RequireUser(pub User);

/// Extractor that requires a shop user token.
pub struct RequireShopUser(pub ShopUser);

/// Extractor that accepts a token of either kind.
pub struct RequireAccount(pub Principal);

/// Pull the token out of an `Authorization: Bearer` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let not_authenticated = || AppError::Unauthorized("Not authenticated".to_owned());

    let value = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(not_authenticated)?;

    let (scheme, token) = value.split_once(' ').ok_or_else(not_authenticated)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(not_authenticated());
    }
    Ok(token)
}

fn tag_sentry(principal: &Principal) {
    match principal {
        Principal::User(user) => set_sentry_user(&user.id, Some(user.email.as_str())),
        Principal::ShopUser(shop_user) => set_sentry_user(
            &format!("shop_user:{}", shop_user.id),
            Some(shop_user.email.as_str()),
        ),
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let principal = state
            .auth()
            .resolve_principal(token, AccountKind::User)
            .await?;
        tag_sentry(&principal);

        match principal {
            Principal::User(user) => Ok(Self(user)),
            Principal::ShopUser(_) => Err(AuthError::InvalidToken.into()),
        }
    }
}

impl FromRequestParts<AppState> for RequireShopUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let principal = state
            .auth()
            .resolve_principal(token, AccountKind::ShopUser)
            .await?;
        tag_sentry(&principal);

        match principal {
            Principal::ShopUser(shop_user) => Ok(Self(shop_user)),
            Principal::User(_) => Err(AuthError::InvalidToken.into()),
        }
    }
}

impl FromRequestParts<AppState> for RequireAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let principal = state.auth().resolve_any(token).await?;
        tag_sentry(&principal);
        Ok(Self(principal))
    }
}

/// Fail with `Forbidden` unless `user` is the account `user_id` names.
///
/// # Errors
///
/// Returns `AppError::Forbidden` on mismatch.
pub fn ensure_same_user(user: &User, user_id: UserId) -> Result<(), AppError> {
    if user.id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not allowed to act for another user".to_owned(),
        ))
    }
}

/// Fail with `Forbidden` unless `shop_user` manages `shop_id`.
///
/// # Errors
///
/// Returns `AppError::Forbidden` on mismatch.
pub fn ensure_same_shop(shop_user: &ShopUser, shop_id: ShopId) -> Result<(), AppError> {
    if shop_user.shop_id == shop_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Not allowed to manage another shop".to_owned(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/auth/me");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_extracts_token() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        let parts = parts_with(Some("bearer abc"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc");
    }

    #[test]
    fn test_bearer_token_rejects_missing_or_other_schemes() {
        assert!(bearer_token(&parts_with(None)).is_err());
        assert!(bearer_token(&parts_with(Some("Basic dXNlcjpwdw=="))).is_err());
        assert!(bearer_token(&parts_with(Some("Bearer "))).is_err());
        assert!(bearer_token(&parts_with(Some("Bearer"))).is_err());
    }
}
