//! Account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::{AccountKind, Email, ShopId, ShopUserId, UserId, Username};

use super::{ValidationError, check_optional_length};

/// Maximum length of a postal address.
pub const MAX_ADDRESS_LENGTH: usize = 255;

/// A general (diner) account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A shop-owner account, tied to the shop it manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopUser {
    pub id: ShopUserId,
    pub shop_id: ShopId,
    pub username: Username,
    pub email: Email,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An authenticated caller, resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    User(User),
    ShopUser(ShopUser),
}

impl Principal {
    #[must_use]
    pub const fn kind(&self) -> AccountKind {
        match self {
            Self::User(_) => AccountKind::User,
            Self::ShopUser(_) => AccountKind::ShopUser,
        }
    }

    #[must_use]
    pub const fn username(&self) -> &Username {
        match self {
            Self::User(user) => &user.username,
            Self::ShopUser(shop_user) => &shop_user.username,
        }
    }
}

/// Registration payload for a general user.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewUser {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the address is too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_optional_length("address", self.address.as_deref(), MAX_ADDRESS_LENGTH)
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("address", &self.address)
            .finish()
    }
}

/// Registration payload for a shop user.
#[derive(Clone, Deserialize)]
pub struct NewShopUser {
    pub shop_id: ShopId,
    pub username: Username,
    pub email: Email,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewShopUser {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the address is too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_optional_length("address", self.address.as_deref(), MAX_ADDRESS_LENGTH)
    }
}

impl std::fmt::Debug for NewShopUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewShopUser")
            .field("shop_id", &self.shop_id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("address", &self.address)
            .finish()
    }
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Clone, Default, Deserialize)]
pub struct AccountChanges {
    #[serde(default)]
    pub username: Option<Username>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl AccountChanges {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the address is too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_optional_length("address", self.address.as_deref(), MAX_ADDRESS_LENGTH)
    }
}

impl std::fmt::Debug for AccountChanges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountChanges")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("address", &self.address)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_rejects_bad_email_on_deserialize() {
        let body = r#"{"username":"alice","email":"alice-at-x","password":"pw123456"}"#;
        assert!(serde_json::from_str::<NewUser>(body).is_err());
    }

    #[test]
    fn test_new_user_address_limit() {
        let mut user: NewUser = serde_json::from_str(
            r#"{"username":"alice","email":"alice@x.com","password":"pw123456"}"#,
        )
        .unwrap();
        assert!(user.validate().is_ok());

        user.address = Some("x".repeat(256));
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let user: NewUser = serde_json::from_str(
            r#"{"username":"alice","email":"alice@x.com","password":"hunter2hunter2"}"#,
        )
        .unwrap();
        let debug = format!("{user:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2hunter2"));

        let changes = AccountChanges {
            password: Some("hunter2hunter2".to_owned()),
            ..AccountChanges::default()
        };
        assert!(!format!("{changes:?}").contains("hunter2hunter2"));
    }

    #[test]
    fn test_user_serializes_without_password_material() {
        let user = User {
            id: UserId::new(1),
            username: Username::parse("alice").unwrap(),
            email: Email::parse("alice@x.com").unwrap(),
            address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "alice");
        assert_eq!(json["email"], "alice@x.com");
        assert!(json.get("password_hash").is_none());
    }
}
