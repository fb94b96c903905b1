//! Discount percentage.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Error returned when a discount falls outside `0..=100`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("discount percent must be between 0 and 100, got {0}")]
pub struct DiscountError(pub i64);

/// Whole-number discount percentage in `0..=100`; `0` means no discount.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
#[serde(transparent)]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// No discount.
    pub const NONE: Self = Self(0);

    /// Largest allowed discount.
    pub const MAX: u8 = 100;

    /// Create a discount, validating the range.
    ///
    /// # Errors
    ///
    /// Returns `DiscountError` if `percent` is negative or above 100.
    pub fn new(percent: i64) -> Result<Self, DiscountError> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= Self::MAX)
            .map(Self)
            .ok_or(DiscountError(percent))
    }

    /// Returns the percentage as a plain integer.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether any discount applies.
    #[must_use]
    pub const fn is_discounted(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<i32> for DiscountPercent {
    type Error = DiscountError;

    fn try_from(percent: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(percent))
    }
}

impl<'de> Deserialize<'de> for DiscountPercent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for DiscountPercent {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for DiscountPercent {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(raw)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for DiscountPercent {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&i32::from(self.0), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(DiscountPercent::new(0).unwrap(), DiscountPercent::NONE);
        assert_eq!(DiscountPercent::new(100).unwrap().get(), 100);
        assert_eq!(DiscountPercent::new(101), Err(DiscountError(101)));
        assert_eq!(DiscountPercent::new(-5), Err(DiscountError(-5)));
    }

    #[test]
    fn test_is_discounted() {
        assert!(!DiscountPercent::NONE.is_discounted());
        assert!(DiscountPercent::new(30).unwrap().is_discounted());
    }

    #[test]
    fn test_display() {
        assert_eq!(DiscountPercent::new(15).unwrap().to_string(), "15%");
    }

    #[test]
    fn test_serde() {
        let discount: DiscountPercent = serde_json::from_str("30").unwrap();
        assert_eq!(serde_json::to_string(&discount).unwrap(), "30");
        assert!(serde_json::from_str::<DiscountPercent>("150").is_err());
    }
}
