//! Announcements sent to the followers of a shop.

use sqlx::PgPool;

use crate::db::{NotificationRepository, RepositoryError};
use crate::models::notification::MAX_CONTENTS_LENGTH;
use crate::models::{Menu, Notification, ShopUser};

/// Notify every follower of `shop_user`'s shop.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the fan-out transaction fails.
pub async fn broadcast(
    pool: &PgPool,
    shop_user: &ShopUser,
    contents: &str,
) -> Result<Vec<Notification>, RepositoryError> {
    let notifications = NotificationRepository::new(pool)
        .fan_out(shop_user.shop_id, Some(shop_user.id), contents)
        .await?;

    tracing::info!(
        shop_id = %shop_user.shop_id,
        recipients = notifications.len(),
        "Broadcast notification"
    );
    Ok(notifications)
}

/// Text of the notification sent when a shop adds a menu.
#[must_use]
pub fn new_menu_message(menu: &Menu) -> String {
    format!("A new menu was added to a shop you like: {}", menu.name)
        .chars()
        .take(MAX_CONTENTS_LENGTH)
        .collect()
}

/// Tell followers about a newly created menu.
///
/// Failures are logged and swallowed; the menu itself is already saved.
pub async fn announce_new_menu(pool: &PgPool, shop_user: &ShopUser, menu: &Menu) {
    if let Err(e) = broadcast(pool, shop_user, &new_menu_message(menu)).await {
        tracing::warn!(
            menu_id = %menu.id,
            shop_id = %menu.shop_id,
            error = %e,
            "Failed to notify followers of new menu"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use menuhub_core::{MenuId, Price, ShopId};

    use super::*;
    use crate::models::notification::validate_contents;

    fn menu(name: &str) -> Menu {
        Menu {
            id: MenuId::new(1),
            shop_id: ShopId::new(1),
            genre_id: None,
            name: name.to_owned(),
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
    fn test_new_menu_message_names_menu() {
        let message = new_menu_message(&menu("Miso Ramen"));
        assert!(message.ends_with("Miso Ramen"));
        assert!(validate_contents(&message).is_ok());
    }

    #[test]
    fn test_new_menu_message_fits_contents_limit() {
        let message = new_menu_message(&menu(&"あ".repeat(100)));
        assert!(validate_contents(&message).is_ok());
    }
}
