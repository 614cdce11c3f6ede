//! Areas, genres and shops.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::{AreaId, GenreId, ShopId};

use super::{ValidationError, check_length, check_optional_length};

const MAX_NAME_LENGTH: usize = 100;
const MAX_URL_LENGTH: usize = 255;
const MAX_PHONE_LENGTH: usize = 20;

/// A geographic grouping of shops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Create/update payload for an area.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaInput {
    pub name: String,
}

impl AreaInput {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name is empty or too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, 1, MAX_NAME_LENGTH)
    }
}

/// A cuisine genre menus can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Create payload for a genre.
#[derive(Debug, Clone, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

impl GenreInput {
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name is empty or too long.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, 1, MAX_NAME_LENGTH)
    }
}

/// A restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shop {
    pub id: ShopId,
    pub area_id: AreaId,
    pub shop_name: String,
    pub shop_detail: Option<String>,
    pub image_path: Option<String>,
    pub homepage_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create payload for a shop.
#[derive(Debug, Clone, Deserialize)]
pub struct NewShop {
    pub area_id: AreaId,
    pub shop_name: String,
    #[serde(default)]
    pub shop_detail: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub homepage_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewShop {
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first field out of bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("shop_name", &self.shop_name, 1, MAX_NAME_LENGTH)?;
        check_optional_length("image_path", self.image_path.as_deref(), MAX_URL_LENGTH)?;
        check_optional_length("homepage_url", self.homepage_url.as_deref(), MAX_URL_LENGTH)?;
        check_optional_length("address", self.address.as_deref(), MAX_URL_LENGTH)?;
        check_optional_length("phone", self.phone.as_deref(), MAX_PHONE_LENGTH)
    }
}

/// Partial shop update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShopChanges {
    pub area_id: Option<AreaId>,
    pub shop_name: Option<String>,
    pub shop_detail: Option<String>,
    pub image_path: Option<String>,
    pub homepage_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl ShopChanges {
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first field out of bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.shop_name {
            check_length("shop_name", name, 1, MAX_NAME_LENGTH)?;
        }
        check_optional_length("image_path", self.image_path.as_deref(), MAX_URL_LENGTH)?;
        check_optional_length("homepage_url", self.homepage_url.as_deref(), MAX_URL_LENGTH)?;
        check_optional_length("address", self.address.as_deref(), MAX_URL_LENGTH)?;
        check_optional_length("phone", self.phone.as_deref(), MAX_PHONE_LENGTH)
    }
}
