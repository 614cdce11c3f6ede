//! Domain models and request payloads.
//!
//! Domain types are validated objects separate from database row types;
//! repositories convert rows into them. Payload types (`New*`, `*Changes`)
//! are deserialized straight from request bodies and checked with
//! `validate()` before anything is written.

pub mod account;
pub mod catalog;
pub mod favorite;
pub mod menu;
pub mod notification;
pub mod page;

pub use account::{AccountChanges, NewShopUser, NewUser, Principal, ShopUser, User};
pub use catalog::{Area, AreaInput, Genre, GenreInput, NewShop, Shop, ShopChanges};
pub use favorite::{Favorite, MenuFavorite};
pub use menu::{Menu, MenuChanges, MenuFilter, NewMenu};
pub use notification::{NewNotification, Notification, NotificationShop, NotificationUser};
pub use page::{Page, Pagination};

/// A request payload failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Check that `value` has between `min` and `max` characters.
pub(crate) fn check_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError(if min == 1 {
            format!("{field} cannot be empty")
        } else {
            format!("{field} must be at least {min} characters")
        }));
    }
    if len > max {
        return Err(ValidationError(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Like [`check_length`] but skips absent values.
pub(crate) fn check_optional_length(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| check_length(field, v, 0, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_length_bounds() {
        assert!(check_length("name", "ramen", 1, 100).is_ok());
        assert_eq!(
            check_length("name", "", 1, 100),
            Err(ValidationError("name cannot be empty".to_owned()))
        );
        assert_eq!(
            check_length("password", "short", 8, 128),
            Err(ValidationError(
                "password must be at least 8 characters".to_owned()
            ))
        );
        assert!(check_length("phone", &"0".repeat(21), 0, 20).is_err());
    }

    #[test]
    fn test_check_optional_length_skips_none() {
        assert!(check_optional_length("address", None, 255).is_ok());
        assert!(check_optional_length("address", Some(&"x".repeat(256)), 255).is_err());
    }
}
