//! Menu domain types and listing filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use menuhub_core::{GenreId, MenuId, Price, ShopId};

use super::{Pagination, ValidationError, check_length, check_optional_length};

const MAX_NAME_LENGTH: usize = 100;
const MAX_CATEGORY_LENGTH: usize = 50;
const MAX_IMAGE_URL_LENGTH: usize = 255;
const MAX_TAGS: usize = 10;
const MAX_TAG_LENGTH: usize = 30;

/// A dish offered by a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub id: MenuId,
    pub shop_id: ShopId,
    pub genre_id: Option<GenreId>,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_true() -> bool {
    true
}

/// Create payload for a menu.
///
/// `shop_id` defaults to the caller's own shop.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenu {
    #[serde(default)]
    pub shop_id: Option<ShopId>,
    #[serde(default)]
    pub genre_id: Option<GenreId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl NewMenu {
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first field out of bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, 1, MAX_NAME_LENGTH)?;
        check_optional_length("category", self.category.as_deref(), MAX_CATEGORY_LENGTH)?;
        check_optional_length("image_url", self.image_url.as_deref(), MAX_IMAGE_URL_LENGTH)?;
        validate_tags(&self.tags)
    }
}

/// Partial menu update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MenuChanges {
    pub genre_id: Option<GenreId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

impl MenuChanges {
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the first field out of bounds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_length("name", name, 1, MAX_NAME_LENGTH)?;
        }
        check_optional_length("category", self.category.as_deref(), MAX_CATEGORY_LENGTH)?;
        check_optional_length("image_url", self.image_url.as_deref(), MAX_IMAGE_URL_LENGTH)?;
        self.tags.as_deref().map_or(Ok(()), validate_tags)
    }
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError(format!(
            "at most {MAX_TAGS} tags are allowed"
        )));
    }
    for tag in tags {
        check_length("tag", tag, 1, MAX_TAG_LENGTH)?;
    }
    Ok(())
}

/// Query string for `GET /menus`.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuFilter {
    #[serde(default = "Pagination::default_page")]
    pub page: u32,
    #[serde(default = "Pagination::default_per_page")]
    pub per_page: u32,
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default = "default_true")]
    pub available_only: bool,
    pub shop_id: Option<ShopId>,
    pub genre_id: Option<GenreId>,
    pub tag: Option<String>,
}

impl Default for MenuFilter {
    fn default() -> Self {
        Self {
            page: Pagination::default_page(),
            per_page: Pagination::default_per_page(),
            category: None,
            search: None,
            available_only: true,
            shop_id: None,
            genre_id: None,
            tag: None,
        }
    }
}

impl MenuFilter {
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// `search` as an `ILIKE` pattern with `%`, `_` and `\` escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref()?.trim();
        if term.is_empty() {
            return None;
        }
        let mut escaped = String::with_capacity(term.len() + 2);
        escaped.push('%');
        for c in term.chars() {
            if matches!(c, '%' | '_' | '\\') {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped.push('%');
        Some(escaped)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn new_menu(json: &str) -> NewMenu {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_new_menu_defaults() {
        let menu = new_menu(r#"{"name": "Shoyu Ramen", "price": 950}"#);
        assert!(menu.is_available);
        assert!(menu.tags.is_empty());
        assert!(menu.shop_id.is_none());
        assert_eq!(menu.price.amount(), Decimal::new(950, 0));
        assert!(menu.validate().is_ok());
    }

    #[test]
    fn test_new_menu_rejects_non_positive_price() {
        assert!(serde_json::from_str::<NewMenu>(r#"{"name": "Free", "price": 0}"#).is_err());
        assert!(serde_json::from_str::<NewMenu>(r#"{"name": "Neg", "price": -5}"#).is_err());
    }

    #[test]
    fn test_menu_payloads_reject_unstorable_prices() {
        assert!(serde_json::from_str::<NewMenu>(r#"{"name": "Tiny", "price": 0.001}"#).is_err());
        assert!(serde_json::from_str::<NewMenu>(r#"{"name": "Huge", "price": 1e9}"#).is_err());
        assert!(serde_json::from_str::<MenuChanges>(r#"{"price": 9.999}"#).is_err());
        assert!(serde_json::from_str::<MenuChanges>(r#"{"price": 9.99}"#).is_ok());
    }

    #[test]
    fn test_tag_limits() {
        let mut menu = new_menu(r#"{"name": "Gyoza", "price": 400}"#);
        menu.tags = (0..10).map(|i| format!("tag{i}")).collect();
        assert!(menu.validate().is_ok());

        menu.tags.push("one-too-many".to_owned());
        assert!(menu.validate().is_err());

        menu.tags = vec!["x".repeat(31)];
        assert!(menu.validate().is_err());
    }

    #[test]
    fn test_menu_changes_validate_only_present_fields() {
        assert!(MenuChanges::default().validate().is_ok());
        let changes = MenuChanges {
            name: Some("x".repeat(101)),
            ..MenuChanges::default()
        };
        assert!(changes.validate().is_err());
    }

    #[test]
    fn test_filter_defaults_from_empty_query() {
        let filter: MenuFilter = serde_json::from_str("{}").unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.per_page, 10);
        assert!(filter.available_only);
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        let filter = MenuFilter {
            search: Some("50%_off\\".to_owned()),
            ..MenuFilter::default()
        };
        assert_eq!(filter.search_pattern().unwrap(), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_search_pattern_ignores_blank() {
        let filter = MenuFilter {
            search: Some("   ".to_owned()),
            ..MenuFilter::default()
        };
        assert!(filter.search_pattern().is_none());
    }
}
