//! Type-safe menu price using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price must be greater than zero")]
    NotPositive,

    #[error("price must have at most {} decimal places", MAX_SCALE)]
    TooPrecise,

    #[error("price must be less than {}", MAX_AMOUNT)]
    TooLarge,
}

/// Decimal places the `NUMERIC(10, 2)` column keeps.
pub const MAX_SCALE: u32 = 2;

/// Exclusive upper bound: eight integer digits.
pub const MAX_AMOUNT: i64 = 100_000_000;

/// A strictly positive menu price with at most two decimal places.
///
/// Stored as `NUMERIC(10, 2)` and serialized as a JSON number.
///
/// ```
/// use menuhub_core::Price;
/// use rust_decimal::Decimal;
///
/// assert!(Price::new(Decimal::new(980, 0)).is_ok());
/// assert!(Price::new(Decimal::ZERO).is_err());
/// assert!(Price::new(Decimal::new(9999, 3)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Create a price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::NotPositive`] for zero or negative amounts,
    /// [`PriceError::TooPrecise`] past two decimal places and
    /// [`PriceError::TooLarge`] from [`MAX_AMOUNT`] up.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }
        // Trailing zeros ("9.50") are not extra precision
        let amount = amount.normalize();
        if amount.scale() > MAX_SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount >= Decimal::from(MAX_AMOUNT) {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(Price::new(Decimal::ZERO), Err(PriceError::NotPositive));
        assert_eq!(Price::new(Decimal::new(-1, 0)), Err(PriceError::NotPositive));
        assert!(Price::new(Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn test_rejects_what_the_column_cannot_hold() {
        assert_eq!(Price::new(Decimal::new(1, 3)), Err(PriceError::TooPrecise));
        assert_eq!(Price::new(Decimal::new(9999, 3)), Err(PriceError::TooPrecise));
        assert_eq!(
            Price::new(Decimal::from(MAX_AMOUNT)),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Price::new(Decimal::new(1_000_000_000, 0)),
            Err(PriceError::TooLarge)
        );
        assert!(Price::new(Decimal::new(9_999_999_999, 2)).is_ok());
    }

    #[test]
    fn test_trailing_zeros_are_not_extra_precision() {
        let price = Price::new(Decimal::new(95_000, 4)).unwrap();
        assert_eq!(price.amount(), Decimal::new(95, 1));
    }

    #[test]
    fn test_serializes_as_number() {
        let price = Price::new(Decimal::new(1250, 2)).unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "12.5");
    }

    #[test]
    fn test_deserialize_accepts_json_numbers() {
        let price: Price = serde_json::from_str("980").unwrap();
        assert_eq!(price.amount(), Decimal::new(980, 0));

        let price: Price = serde_json::from_str("4.5").unwrap();
        assert_eq!(price.amount(), Decimal::new(45, 1));
    }

    #[test]
    fn test_deserialize_rejects_non_positive() {
        assert!(serde_json::from_str::<Price>("0").is_err());
        assert!(serde_json::from_str::<Price>("-3.2").is_err());
    }

    #[test]
    fn test_deserialize_rejects_unstorable_amounts() {
        assert!(serde_json::from_str::<Price>("0.001").is_err());
        assert!(serde_json::from_str::<Price>("9.999").is_err());
        assert!(serde_json::from_str::<Price>("1000000000").is_err());
        assert!(serde_json::from_str::<Price>("9.99").is_ok());
    }
}
