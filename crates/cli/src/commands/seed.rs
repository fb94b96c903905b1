//! Seed the catalog from a YAML file.
//!
//! The file lists categories and products. Seeding is an upsert: existing
//! rows with the same id are overwritten and a product's sizes and offers are
//! replaced wholesale, so the same file can be loaded repeatedly.
//!
//! ```yaml
//! categories:
//!   - id: 1
//!     name: Shoes
//! products:
//!   - id: P001
//!     name: Trail Runner
//!     categoryId: 1
//!     price: "89.99"
//!     discountPercent: 20
//!     quantityInStock: 12
//!     sizes: ["41", "42"]
//!     offers: ["Free shipping"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::{error, info};

use fashionhub_core::{CategoryId, DiscountPercent, ListingKey, Price};
use fashionhub_storefront::config::{ConfigError, StorefrontConfig};
use fashionhub_storefront::db;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The seed file could not be read.
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The seed file is not valid YAML or has invalid values.
    #[error("Invalid seed file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The seed file parsed but is inconsistent.
    #[error("{} validation errors found", .0.len())]
    Invalid(Vec<String>),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A catalog seed file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// One category entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategorySeed {
    pub id: CategoryId,
    pub name: String,
}

/// One product entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductSeed {
    pub id: ListingKey,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub description: Option<String>,
    pub price: Price,
    pub original_price: Option<Price>,
    #[serde(default)]
    pub discount_percent: DiscountPercent,
    #[serde(default)]
    pub quantity_in_stock: i32,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    /// Defaults to the load time for new products; kept on update when absent.
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub offers: Vec<String>,
}

/// Row counts written by a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
}

impl CatalogSeed {
    /// Parse a seed file's contents.
    ///
    /// # Errors
    ///
    /// Returns the YAML error, including domain value errors such as a
    /// discount above 100 or an over-long product id.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Check cross-entry consistency. Returns every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut category_ids = HashSet::new();
        for category in &self.categories {
            if !category_ids.insert(category.id) {
                errors.push(format!("category {}: duplicate id", category.id));
            }
            if category.name.trim().is_empty() {
                errors.push(format!("category {}: name is empty", category.id));
            }
        }

        let mut product_ids = HashSet::new();
        for product in &self.products {
            let id = &product.id;
            if !product_ids.insert(id) {
                errors.push(format!("product {id}: duplicate id"));
            }
            if product.name.trim().is_empty() {
                errors.push(format!("product {id}: name is empty"));
            }
            if product.quantity_in_stock < 0 {
                errors.push(format!("product {id}: quantityInStock is negative"));
            }
            if product.sizes.iter().any(|s| s.trim().is_empty()) {
                errors.push(format!("product {id}: blank size label"));
            }
        }

        errors
    }
}

/// Load a catalog seed file into the storefront database.
///
/// The file is parsed and validated before connecting; all writes happen in
/// one transaction.
///
/// # Errors
///
/// Returns `SeedError` if the file is unreadable or invalid, or if any write
/// fails (in which case nothing is written).
pub async fn catalog(file_path: &str) -> Result<SeedSummary, SeedError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading catalog seed");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: file_path.to_string(),
            source,
        })?;
    let seed = CatalogSeed::from_yaml(&content)?;

    let errors = seed.validate();
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors));
    }

    info!(
        categories = seed.categories.len(),
        products = seed.products.len(),
        "Seed file validated"
    );

    let config = StorefrontConfig::from_env()?;
    let pool = db::create_pool(&config.database).await?;

    apply(&pool, &seed).await
}

async fn apply(pool: &PgPool, seed: &CatalogSeed) -> Result<SeedSummary, SeedError> {
    let mut tx = pool.begin().await?;

    for category in &seed.categories {
        upsert_category(&mut tx, category).await?;
    }
    if !seed.categories.is_empty() {
        // Explicit ids bypass the serial; move it past them.
        sqlx::query(
            r"
            SELECT setval(pg_get_serial_sequence('categories', 'category_id'),
                          COALESCE(MAX(category_id), 1))
            FROM categories
            ",
        )
        .execute(&mut *tx)
        .await?;
    }

    for product in &seed.products {
        upsert_product(&mut tx, product).await?;
    }

    tx.commit().await?;

    Ok(SeedSummary {
        categories: seed.categories.len(),
        products: seed.products.len(),
    })
}

async fn upsert_category(
    tx: &mut Transaction<'_, Postgres>,
    category: &CategorySeed,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO categories (category_id, category_name)
        VALUES ($1, $2)
        ON CONFLICT (category_id) DO UPDATE SET category_name = EXCLUDED.category_name
        ",
    )
    .bind(category.id)
    .bind(category.name.trim())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn upsert_product(
    tx: &mut Transaction<'_, Postgres>,
    product: &ProductSeed,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO products
            (product_id, product_name, category_id, description, price, original_price,
             discount_percent, quantity_in_stock, brand, image_url, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, now()))
        ON CONFLICT (product_id) DO UPDATE SET
            product_name = EXCLUDED.product_name,
            category_id = EXCLUDED.category_id,
            description = EXCLUDED.description,
            price = EXCLUDED.price,
            original_price = EXCLUDED.original_price,
            discount_percent = EXCLUDED.discount_percent,
            quantity_in_stock = EXCLUDED.quantity_in_stock,
            brand = EXCLUDED.brand,
            image_url = EXCLUDED.image_url,
            created_at = COALESCE($11, products.created_at)
        ",
    )
    .bind(&product.id)
    .bind(product.name.trim())
    .bind(product.category_id)
    .bind(product.description.as_deref())
    .bind(product.price)
    .bind(product.original_price)
    .bind(product.discount_percent)
    .bind(product.quantity_in_stock)
    .bind(product.brand.as_deref())
    .bind(product.image_url.as_deref())
    .bind(product.created_at)
    .execute(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM product_sizes WHERE product_id = $1")
        .bind(&product.id)
        .execute(&mut **tx)
        .await?;
    for size in &product.sizes {
        sqlx::query("INSERT INTO product_sizes (product_id, size) VALUES ($1, $2)")
            .bind(&product.id)
            .bind(size.trim())
            .execute(&mut **tx)
            .await?;
    }

    sqlx::query("DELETE FROM offers WHERE product_id = $1")
        .bind(&product.id)
        .execute(&mut **tx)
        .await?;
    for offer in &product.offers {
        sqlx::query("INSERT INTO offers (product_id, offer_description) VALUES ($1, $2)")
            .bind(&product.id)
            .bind(offer)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_seed_is_valid() {
        let seed = CatalogSeed::from_yaml(include_str!("../../seed/catalog.yaml")).unwrap();
        assert!(!seed.products.is_empty());
        assert_eq!(seed.validate(), Vec::<String>::new());
    }

    #[test]
    fn test_defaults() {
        let seed = CatalogSeed::from_yaml(
            r#"
products:
  - id: P001
    name: Basic Tee
    price: "19.99"
"#,
        )
        .unwrap();

        let product = &seed.products[0];
        assert!(seed.categories.is_empty());
        assert_eq!(product.discount_percent, DiscountPercent::NONE);
        assert_eq!(product.quantity_in_stock, 0);
        assert!(product.category_id.is_none());
        assert!(product.sizes.is_empty());
        assert!(product.created_at.is_none());
    }

    #[test]
    fn test_domain_values_rejected_at_parse() {
        let over_discount = r#"
products:
  - id: P001
    name: Tee
    price: "19.99"
    discountPercent: 120
"#;
        assert!(CatalogSeed::from_yaml(over_discount).is_err());

        let long_key = r#"
products:
  - id: P0000000001
    name: Tee
    price: "19.99"
"#;
        assert!(CatalogSeed::from_yaml(long_key).is_err());

        assert!(CatalogSeed::from_yaml("colours: []").is_err());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let seed = CatalogSeed::from_yaml(
            r#"
categories:
  - id: 1
    name: Shoes
  - id: 1
    name: " "
products:
  - id: P001
    name: Tee
    price: "19.99"
    quantityInStock: -2
  - id: P001
    name: Tee again
    price: "9.99"
    sizes: ["M", ""]
"#,
        )
        .unwrap();

        let errors = seed.validate();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&"category 1: duplicate id".to_string()));
        assert!(errors.contains(&"product P001: quantityInStock is negative".to_string()));
        assert!(errors.contains(&"product P001: blank size label".to_string()));
    }
}
