//! Catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use fashionhub_core::{CategoryId, DiscountPercent, ListingKey, Price};

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    #[serde(rename = "categoryId")]
    pub id: CategoryId,
    #[serde(rename = "categoryName")]
    pub name: String,
}

/// A fully resolved catalog listing (domain type).
///
/// Sizes and offers are loaded eagerly with the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub key: ListingKey,
    pub name: String,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub price: Price,
    pub original_price: Option<Price>,
    pub discount: DiscountPercent,
    pub quantity_in_stock: u32,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sizes: Vec<String>,
    pub offers: Vec<String>,
}

impl Listing {
    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.quantity_in_stock > 0
    }
}

/// The query shapes a catalog store answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingFilter {
    /// Every listing.
    All,
    /// The single listing with this key.
    Key(ListingKey),
    /// Listings assigned to the category.
    Category(CategoryId),
    /// Name or description contains the term, ignoring case.
    Search(String),
    /// Exact, case-sensitive brand match.
    Brand(String),
    /// Price within `min..=max`.
    PriceRange { min: Decimal, max: Decimal },
    /// Discount above zero.
    Discounted,
    /// At least one unit in stock.
    Available,
    /// Every listing; callers order by recency.
    Latest,
}

impl ListingFilter {
    /// Reference predicate for the filter.
    ///
    /// Stores that cannot push the filter down evaluate this directly; SQL
    /// stores translate each variant to an equivalent `WHERE` clause.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::All | Self::Latest => true,
            Self::Key(key) => listing.key == *key,
            Self::Category(id) => listing.category.as_ref().is_some_and(|c| c.id == *id),
            Self::Search(term) => {
                let needle = term.trim().to_lowercase();
                needle.is_empty()
                    || listing.name.to_lowercase().contains(&needle)
                    || listing
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
            Self::Brand(brand) => listing.brand.as_deref() == Some(brand.as_str()),
            Self::PriceRange { min, max } => {
                let price = listing.price.amount();
                *min <= price && price <= *max
            }
            Self::Discounted => listing.discount.is_discounted(),
            Self::Available => listing.is_available(),
        }
    }
}

/// Client-facing projection of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    #[serde(rename = "productId")]
    pub key: ListingKey,
    #[serde(rename = "productName")]
    pub name: String,
    pub category_name: Option<String>,
    pub description: Option<String>,
    pub price: Price,
    pub original_price: Option<Price>,
    #[serde(rename = "discountPercent")]
    pub discount: DiscountPercent,
    pub quantity_in_stock: u32,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub sizes: Vec<String>,
    pub offers: Vec<String>,
}

impl From<Listing> for ListingRecord {
    fn from(listing: Listing) -> Self {
        Self {
            key: listing.key,
            name: listing.name,
            category_name: listing.category.map(|c| c.name),
            description: listing.description,
            price: listing.price,
            original_price: listing.original_price,
            discount: listing.discount,
            quantity_in_stock: listing.quantity_in_stock,
            brand: listing.brand,
            image_url: listing.image_url,
            sizes: listing.sizes,
            offers: listing.offers,
        }
    }
}
