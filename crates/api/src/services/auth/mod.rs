//! Authentication service.
//!
//! Password registration and login for both account kinds, plus bearer
//! token resolution. Users log in with their email, shop users with their
//! username; the token subject is always the username.

mod error;
pub mod password;
pub mod token;

pub use error::AuthError;
pub use password::{hash_password, validate_password, verify_password};
pub use token::{MAX_TTL_MINUTES, TokenClaims, TokenIssuer, ttl_from_minutes};

use sqlx::PgPool;

use menuhub_core::{AccountKind, Email, UserId};

use crate::db::shop_users::NewShopUserRecord;
use crate::db::users::{NewUserRecord, UserUpdate};
use crate::db::{ShopUserRepository, UserRepository};
use crate::models::{AccountChanges, NewShopUser, NewUser, Principal, ShopUser, User};

/// Authentication service.
///
/// Handles registration, login, profile changes and token resolution.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    shop_users: ShopUserRepository<'a>,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenIssuer) -> Self {
        Self {
            users: UserRepository::new(pool),
            shop_users: ShopUserRepository::new(pool),
            tokens,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a general user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::Conflict` if the username or email is already registered.
    pub async fn register_user(&self, new: &NewUser) -> Result<User, AuthError> {
        validate_password(&new.password)?;
        let password_hash = hash_password(&new.password)?;

        let user = self
            .users
            .create(&NewUserRecord {
                username: &new.username,
                email: &new.email,
                password_hash: &password_hash,
                address: new.address.as_deref(),
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Register a shop user for an existing shop.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::Conflict` if the username or email is already registered.
    /// Returns `AuthError::Repository` wrapping `NotFound` if the shop does not exist.
    pub async fn register_shop_user(&self, new: &NewShopUser) -> Result<ShopUser, AuthError> {
        validate_password(&new.password)?;
        let password_hash = hash_password(&new.password)?;

        let shop_user = self
            .shop_users
            .create(&NewShopUserRecord {
                shop_id: new.shop_id,
                username: &new.username,
                email: &new.email,
                password_hash: &password_hash,
                address: new.address.as_deref(),
            })
            .await?;

        tracing::info!(
            shop_user_id = %shop_user.id,
            shop_id = %shop_user.shop_id,
            "Shop user registered"
        );
        Ok(shop_user)
    }

    // =========================================================================
    // Password Authentication
    // =========================================================================

    /// Login a general user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn authenticate_user(&self, email: &Email, password: &str) -> Result<User, AuthError> {
        let Some((user, password_hash)) = self.users.get_password_hash(email).await? else {
            password::verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(user)
    }

    /// Login a shop user with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn authenticate_shop_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ShopUser, AuthError> {
        let Some((shop_user, password_hash)) = self.shop_users.get_password_hash(username).await?
        else {
            password::verify_dummy(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(shop_user)
    }

    /// Issue an access token for an authenticated account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue_token(&self, principal: &Principal) -> Result<String, AuthError> {
        self.tokens
            .issue(principal.username().as_str(), principal.kind())
    }

    // =========================================================================
    // Token Resolution
    // =========================================================================

    /// Resolve a bearer token to an account of the expected kind.
    ///
    /// A token of the other kind is rejected without a database lookup.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token does not verify, has the
    /// wrong kind, or names an account that no longer exists.
    pub async fn resolve_principal(
        &self,
        token: &str,
        expected: AccountKind,
    ) -> Result<Principal, AuthError> {
        let claims = self.tokens.verify(token)?;
        if claims.user_type != expected {
            return Err(AuthError::InvalidToken);
        }
        self.load_principal(&claims).await
    }

    /// Resolve a bearer token to an account of whichever kind it names.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token does not verify or names
    /// an account that no longer exists.
    pub async fn resolve_any(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.tokens.verify(token)?;
        self.load_principal(&claims).await
    }

    async fn load_principal(&self, claims: &TokenClaims) -> Result<Principal, AuthError> {
        let principal = match claims.user_type {
            AccountKind::User => self
                .users
                .get_by_username(&claims.sub)
                .await?
                .map(Principal::User),
            AccountKind::ShopUser => self
                .shop_users
                .get_by_username(&claims.sub)
                .await?
                .map(Principal::ShopUser),
        };
        principal.ok_or(AuthError::InvalidToken)
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// Apply profile changes to a general user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if a new password doesn't meet requirements.
    /// Returns `AuthError::Conflict` if the new username or email is taken.
    pub async fn update_user(
        &self,
        user_id: UserId,
        changes: &AccountChanges,
    ) -> Result<User, AuthError> {
        let password_hash = match changes.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        let user = self
            .users
            .update(
                user_id,
                &UserUpdate {
                    username: changes.username.as_ref(),
                    email: changes.email.as_ref(),
                    password_hash: password_hash.as_deref(),
                    address: changes.address.as_deref(),
                },
            )
            .await?;

        Ok(user)
    }
}
