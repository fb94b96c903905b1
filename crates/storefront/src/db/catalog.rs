//! Catalog store: listings, their child collections, and categories.
//!
//! Queries are built at runtime with [`QueryBuilder`] because the filter set
//! is closed but each variant needs a different `WHERE` clause.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use fashionhub_core::{CategoryId, DiscountPercent, ListingKey, Price};

use super::RepositoryError;
use crate::models::{Category, Listing, ListingFilter};

/// Read access to the product catalog.
///
/// Implementations return listings fully resolved (category, sizes, offers).
/// Ordering is not part of the contract; [`crate::services::CatalogService`]
/// sorts results itself.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Listings matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the store is unreachable and
    /// `RepositoryError::DataCorruption` if a row cannot be decoded.
    async fn find_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError>;

    /// Every non-null brand, possibly with duplicates.
    async fn distinct_brands(&self) -> Result<Vec<String>, RepositoryError>;

    /// Every size label in use, possibly with duplicates.
    async fn distinct_sizes(&self) -> Result<Vec<String>, RepositoryError>;

    /// All categories.
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    /// A single category.
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;

    /// Categories whose name contains the term, ignoring case.
    async fn search_categories(&self, term: &str) -> Result<Vec<Category>, RepositoryError>;

    /// Verify the backing store answers.
    async fn health_check(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    product_id: String,
    product_name: String,
    category_id: Option<i32>,
    category_name: Option<String>,
    description: Option<String>,
    price: Decimal,
    original_price: Option<Decimal>,
    discount_percent: i32,
    quantity_in_stock: i32,
    brand: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl ListingRow {
    fn into_listing(
        self,
        sizes: Vec<String>,
        offers: Vec<String>,
    ) -> Result<Listing, RepositoryError> {
        let corrupt = |what: &str, e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!(
                "invalid {what} for product {}: {e}",
                self.product_id
            ))
        };

        let key = ListingKey::parse(&self.product_id).map_err(|e| corrupt("key", &e))?;
        let price = Price::new(self.price).map_err(|e| corrupt("price", &e))?;
        let original_price = self
            .original_price
            .map(Price::new)
            .transpose()
            .map_err(|e| corrupt("original price", &e))?;
        let discount =
            DiscountPercent::try_from(self.discount_percent).map_err(|e| corrupt("discount", &e))?;
        let quantity_in_stock =
            u32::try_from(self.quantity_in_stock).map_err(|e| corrupt("stock quantity", &e))?;

        let category = match (self.category_id, self.category_name) {
            (Some(id), Some(name)) => Some(Category {
                id: CategoryId::new(id),
                name,
            }),
            _ => None,
        };

        Ok(Listing {
            key,
            name: self.product_name,
            category,
            description: self.description,
            price,
            original_price,
            discount,
            quantity_in_stock,
            brand: self.brand,
            image_url: self.image_url,
            created_at: self.created_at,
            sizes,
            offers,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    category_id: i32,
    category_name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.category_id),
            name: row.category_name,
        }
    }
}

// =============================================================================
// PostgreSQL Store
// =============================================================================

const LISTING_SELECT: &str = r"
    SELECT p.product_id, p.product_name, p.category_id, c.category_name,
           p.description, p.price, p.original_price, p.discount_percent,
           p.quantity_in_stock, p.brand, p.image_url, p.created_at
    FROM products p
    LEFT JOIN categories c ON c.category_id = p.category_id
";

/// `PostgreSQL`-backed catalog store.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a new catalog store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load `(product_id, value)` pairs from a child table for the given keys.
    async fn load_children(
        &self,
        sql: &str,
        keys: &[String],
    ) -> Result<HashMap<String, Vec<String>>, RepositoryError> {
        let rows: Vec<(String, String)> = sqlx::query_as(sql)
            .bind(keys)
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
        for (product_id, value) in rows {
            grouped.entry(product_id).or_default().push(value);
        }
        Ok(grouped)
    }
}

/// Append the `WHERE` clause for a filter.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    match filter {
        ListingFilter::All | ListingFilter::Latest => {}
        ListingFilter::Key(key) => {
            builder.push(" WHERE p.product_id = ");
            builder.push_bind(key.as_str().to_owned());
        }
        ListingFilter::Category(id) => {
            builder.push(" WHERE p.category_id = ");
            builder.push_bind(id.as_i32());
        }
        ListingFilter::Search(term) => {
            let pattern = format!("%{}%", escape_like(term.trim()));
            builder.push(" WHERE p.product_name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR p.description ILIKE ");
            builder.push_bind(pattern);
            builder.push(r" ESCAPE '\'");
        }
        ListingFilter::Brand(brand) => {
            builder.push(" WHERE p.brand = ");
            builder.push_bind(brand.clone());
        }
        ListingFilter::PriceRange { min, max } => {
            builder.push(" WHERE p.price BETWEEN ");
            builder.push_bind(*min);
            builder.push(" AND ");
            builder.push_bind(*max);
        }
        ListingFilter::Discounted => {
            builder.push(" WHERE p.discount_percent > 0");
        }
        ListingFilter::Available => {
            builder.push(" WHERE p.quantity_in_stock > 0");
        }
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[tracing::instrument(skip(self))]
    async fn find_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError> {
        let mut builder = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        push_filter(&mut builder, filter);

        let rows: Vec<ListingRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = rows.iter().map(|r| r.product_id.clone()).collect();
        let mut sizes = self
            .load_children(
                "SELECT product_id, size FROM product_sizes WHERE product_id = ANY($1) ORDER BY id",
                &keys,
            )
            .await?;
        let mut offers = self
            .load_children(
                "SELECT product_id, offer_description FROM offers WHERE product_id = ANY($1) ORDER BY id",
                &keys,
            )
            .await?;

        rows.into_iter()
            .map(|row| {
                let row_sizes = sizes.remove(&row.product_id).unwrap_or_default();
                let row_offers = offers.remove(&row.product_id).unwrap_or_default();
                row.into_listing(row_sizes, row_offers)
            })
            .collect()
    }

    #[tracing::instrument(skip(self))]
    async fn distinct_brands(&self) -> Result<Vec<String>, RepositoryError> {
        let brands: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT brand FROM products WHERE brand IS NOT NULL ORDER BY brand",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(brands)
    }

    #[tracing::instrument(skip(self))]
    async fn distinct_sizes(&self) -> Result<Vec<String>, RepositoryError> {
        let sizes: Vec<String> = sqlx::query_scalar("SELECT DISTINCT size FROM product_sizes ORDER BY size")
            .fetch_all(&self.pool)
            .await?;
        Ok(sizes)
    }

    #[tracing::instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(
            "SELECT category_id, category_name FROM categories ORDER BY category_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "SELECT category_id, category_name FROM categories WHERE category_id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Category::from))
    }

    #[tracing::instrument(skip(self))]
    async fn search_categories(&self, term: &str) -> Result<Vec<Category>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(term.trim()));
        let rows: Vec<CategoryRow> = sqlx::query_as(
            r"SELECT category_id, category_name FROM categories
              WHERE category_name ILIKE $1 ESCAPE '\'
              ORDER BY category_id",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%"), r"50\%");
        assert_eq!(escape_like("a_b"), r"a\_b");
        assert_eq!(escape_like(r"c:\x"), r"c:\\x");
        assert_eq!(escape_like("denim"), "denim");
    }

    #[test]
    fn test_push_filter_binds_search_twice() {
        let mut builder = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        push_filter(&mut builder, &ListingFilter::Search("shirt".to_string()));
        let sql = builder.sql();

        assert!(sql.contains("p.product_name ILIKE $1"));
        assert!(sql.contains("p.description ILIKE $2"));
    }

    #[test]
    fn test_push_filter_all_has_no_where() {
        let mut builder = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        push_filter(&mut builder, &ListingFilter::All);
        assert!(!builder.sql().contains("WHERE"));
    }

    #[test]
    fn test_row_with_bad_discount_is_corruption() {
        let row = ListingRow {
            product_id: "P001".to_string(),
            product_name: "Tee".to_string(),
            category_id: None,
            category_name: None,
            description: None,
            price: Decimal::new(1000, 2),
            original_price: None,
            discount_percent: 130,
            quantity_in_stock: 1,
            brand: None,
            image_url: None,
            created_at: Utc::now(),
        };

        let err = row.into_listing(Vec::new(), Vec::new()).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
