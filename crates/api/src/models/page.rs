//! Page-number pagination shared by list endpoints.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Largest accepted `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

/// Requested page window (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default = "Pagination::default_page")]
    pub page: u32,
    #[serde(default = "Pagination::default_per_page")]
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Self::default_page(),
            per_page: Self::default_per_page(),
        }
    }
}

impl Pagination {
    pub(crate) const fn default_page() -> u32 {
        1
    }

    pub(crate) const fn default_per_page() -> u32 {
        10
    }

    /// # Errors
    ///
    /// Returns a `ValidationError` if `page` is zero or `per_page` is
    /// outside `1..=100`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page == 0 {
            return Err(ValidationError("page must be at least 1".to_owned()));
        }
        if self.per_page == 0 || self.per_page > MAX_PER_PAGE {
            return Err(ValidationError(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        Ok(())
    }

    /// SQL `LIMIT`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    /// SQL `OFFSET`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let p = Pagination {
            page: 3,
            per_page: 20,
        };
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(Pagination::default().offset(), 0);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(Pagination::default().validate().is_ok());
        assert!(Pagination { page: 0, per_page: 10 }.validate().is_err());
        assert!(Pagination { page: 1, per_page: 0 }.validate().is_err());
        assert!(Pagination { page: 1, per_page: 101 }.validate().is_err());
        assert!(Pagination { page: 1, per_page: 100 }.validate().is_ok());
    }
}
