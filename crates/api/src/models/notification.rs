//! Notifications and their delivery-tracking join rows.

use chrono::{DateTime, Utc};
use serde::Serialize;

use menuhub_core::{
    NotificationId, NotificationShopId, NotificationStatus, NotificationUserId, ShopId,
    ShopUserId, UserId,
};

use super::{ValidationError, check_length};

/// Maximum length of notification text.
pub const MAX_CONTENTS_LENGTH: usize = 255;

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub shop_id: Option<ShopId>,
    pub shop_user_id: Option<ShopUserId>,
    pub contents: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

/// Values for a new notification. It always starts unread.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: UserId,
    pub shop_id: Option<ShopId>,
    pub shop_user_id: Option<ShopUserId>,
    pub contents: String,
}

impl NewNotification {
    /// # Errors
    ///
    /// Returns a `ValidationError` unless `contents` has 1 to 255 characters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_contents(&self.contents)
    }
}

/// Check notification text length.
///
/// # Errors
///
/// Returns a `ValidationError` unless `contents` has 1 to 255 characters.
pub fn validate_contents(contents: &str) -> Result<(), ValidationError> {
    check_length("contents", contents, 1, MAX_CONTENTS_LENGTH)
}

/// Links a notification to a shop it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationShop {
    pub id: NotificationShopId,
    pub notification_id: NotificationId,
    pub shop_id: ShopId,
    pub created_at: DateTime<Utc>,
}

/// Records delivery of a notification to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationUser {
    pub id: NotificationUserId,
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
