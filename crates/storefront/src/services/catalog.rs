//! Catalog query service.
//!
//! Every operation is a fresh read against the store. Ordering and
//! de-duplication are applied here so they hold for any [`CatalogStore`].

use std::cmp::Reverse;
use std::sync::Arc;

use rust_decimal::Decimal;

use fashionhub_core::{CategoryId, ListingKey};

use super::ServiceError;
use crate::db::CatalogStore;
use crate::models::{Category, Listing, ListingFilter};

/// Read-only catalog operations.
pub struct CatalogService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for CatalogService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CatalogStore + ?Sized> CatalogService<S> {
    /// Create a service over the given store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn find(&self, filter: &ListingFilter) -> Result<Vec<Listing>, ServiceError> {
        let mut listings = self.store.find_listings(filter).await?;
        listings.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(listings)
    }

    /// All listings, by key.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_all(&self) -> Result<Vec<Listing>, ServiceError> {
        self.find(&ListingFilter::All).await
    }

    /// A single listing.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no listing has this key (including
    /// keys that could never be valid).
    pub async fn get_by_id(&self, key: &str) -> Result<Listing, ServiceError> {
        let Ok(parsed) = ListingKey::parse(key) else {
            return Err(ServiceError::not_found("listing", key));
        };

        self.store
            .find_listings(&ListingFilter::Key(parsed))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::not_found("listing", key))
    }

    /// Listings in a category; empty when the category has none or does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Listing>, ServiceError> {
        self.find(&ListingFilter::Category(category_id)).await
    }

    /// Listings whose name or description contains `term`, ignoring case.
    ///
    /// A blank term matches every listing.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Listing>, ServiceError> {
        self.find(&ListingFilter::Search(term.trim().to_owned()))
            .await
    }

    /// Listings of exactly this brand (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_by_brand(&self, brand: &str) -> Result<Vec<Listing>, ServiceError> {
        self.find(&ListingFilter::Brand(brand.to_owned())).await
    }

    /// Listings priced within `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if `min > max`.
    pub async fn list_by_price_range(
        &self,
        min: Decimal,
        max: Decimal,
    ) -> Result<Vec<Listing>, ServiceError> {
        if min > max {
            return Err(ServiceError::validation(
                "minPrice",
                "Minimum price must not exceed maximum price",
            ));
        }
        self.find(&ListingFilter::PriceRange { min, max }).await
    }

    /// Discounted listings, largest discount first, ties by key.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_discounted(&self) -> Result<Vec<Listing>, ServiceError> {
        let mut listings = self.find(&ListingFilter::Discounted).await?;
        // `find` already sorted by key and the sort is stable.
        listings.sort_by_key(|l| Reverse(l.discount));
        Ok(listings)
    }

    /// Listings with stock on hand.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_available(&self) -> Result<Vec<Listing>, ServiceError> {
        self.find(&ListingFilter::Available).await
    }

    /// All listings, newest first, ties by key.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_latest(&self) -> Result<Vec<Listing>, ServiceError> {
        let mut listings = self.find(&ListingFilter::Latest).await?;
        listings.sort_by_key(|l| Reverse(l.created_at));
        Ok(listings)
    }

    /// Distinct brands, ascending.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_all_brands(&self) -> Result<Vec<String>, ServiceError> {
        let mut brands = self.store.distinct_brands().await?;
        brands.sort_unstable();
        brands.dedup();
        Ok(brands)
    }

    /// Distinct size labels, ascending.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_all_sizes(&self) -> Result<Vec<String>, ServiceError> {
        let mut sizes = self.store.distinct_sizes().await?;
        sizes.sort_unstable();
        sizes.dedup();
        Ok(sizes)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories, by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, ServiceError> {
        let mut categories = self.store.list_categories().await?;
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    /// A single category.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the category does not exist.
    pub async fn get_category(&self, id: CategoryId) -> Result<Category, ServiceError> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("category", id))
    }

    /// Categories whose name contains `term`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn search_categories(&self, term: &str) -> Result<Vec<Category>, ServiceError> {
        let mut categories = self.store.search_categories(term.trim()).await?;
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }
}
