//! Externally visible listing key.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Errors that can occur when parsing a [`ListingKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingKeyError {
    /// The input is empty after trimming.
    #[error("listing key cannot be empty")]
    Empty,
    /// The input is longer than the `product_id` column allows.
    #[error("listing key must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// The short, fixed-format key a listing is published under (e.g. `P001`).
///
/// Keys are assigned when the catalog is seeded, never by the database.
///
/// ```
/// use fashionhub_core::ListingKey;
///
/// assert_eq!(ListingKey::parse(" P001 ").unwrap().as_str(), "P001");
/// assert!(ListingKey::parse("").is_err());
/// assert!(ListingKey::parse("P0000000001").is_err());
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ListingKey(String);

impl ListingKey {
    /// Maximum key length (`products.product_id` is `VARCHAR(10)`).
    pub const MAX_LENGTH: usize = 10;

    /// Parse a `ListingKey`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`] characters.
    pub fn parse(s: &str) -> Result<Self, ListingKeyError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ListingKeyError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(ListingKeyError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the key and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ListingKey {
    type Err = ListingKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for ListingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ListingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ListingKey {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ListingKey {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ListingKey {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        assert_eq!(ListingKey::parse("  P010\n").unwrap().as_str(), "P010");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ListingKey::parse("  "), Err(ListingKeyError::Empty));
    }

    #[test]
    fn test_parse_max_length() {
        assert!(ListingKey::parse("ABCDEFGHIJ").is_ok());
        assert_eq!(
            ListingKey::parse("ABCDEFGHIJK"),
            Err(ListingKeyError::TooLong { max: 10 })
        );
    }

    #[test]
    fn test_keys_order_lexicographically() {
        let mut keys = vec![
            ListingKey::parse("P003").unwrap(),
            ListingKey::parse("P001").unwrap(),
            ListingKey::parse("P002").unwrap(),
        ];
        keys.sort();
        let keys: Vec<&str> = keys.iter().map(ListingKey::as_str).collect();
        assert_eq!(keys, ["P001", "P002", "P003"]);
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<ListingKey>("\"\"").is_err());
        let key: ListingKey = serde_json::from_str("\"P001\"").unwrap();
        assert_eq!(key.to_string(), "P001");
    }
}
