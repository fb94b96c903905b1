//! Store adapters for the storefront.
//!
//! # Database: `fashionhub`
//!
//! ## Tables
//!
//! - `categories` - Product categories
//! - `products` - Catalog listings keyed by a short seeded key
//! - `product_sizes` - Size labels per listing (cascade with the listing)
//! - `offers` - Promotional offer text per listing (cascade with the listing)
//! - `accounts` - Registered shoppers, keyed by an application-allocated id
//!
//! Each concern is reached through a trait ([`CatalogStore`], [`AccountStore`])
//! with a `PostgreSQL` implementation for production and an in-memory one
//! ([`memory`]) for tests and local development.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p fashionhub-cli -- migrate
//! ```

pub mod accounts;
pub mod catalog;
pub mod memory;

use std::str::FromStr;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;

pub use accounts::{AccountStore, PgAccountStore};
pub use catalog::{CatalogStore, PgCatalogStore};
pub use memory::{MemoryAccountStore, MemoryCatalogStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx (connectivity, timeouts, query failures).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Another writer claimed the allocated account id first.
    #[error("account id already taken by a concurrent insert")]
    IdCollision,
}

/// Create a `PostgreSQL` connection pool from configuration.
///
/// Every connection carries a `statement_timeout` so a stuck query surfaces
/// as an error instead of holding the request open.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be
/// established.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let statement_timeout_ms = config.statement_timeout.as_millis().to_string();
    let options = PgConnectOptions::from_str(config.url.expose_secret())?
        .options([("statement_timeout", statement_timeout_ms.as_str())]);

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(options)
        .await
}
