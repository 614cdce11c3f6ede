//! Shop and menu favorites.

use chrono::{DateTime, Utc};
use serde::Serialize;

use menuhub_core::{MenuId, ShopId, UserId};

/// A user's bookmark on a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Favorite {
    pub user_id: UserId,
    pub shop_id: ShopId,
    pub created_at: DateTime<Utc>,
}

/// A user's bookmark on a single menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuFavorite {
    pub user_id: UserId,
    pub menu_id: MenuId,
    pub created_at: DateTime<Utc>,
}
