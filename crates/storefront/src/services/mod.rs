//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `catalog` - Listing and category queries
//! - `accounts` - Registration, login, and account lookups
//!
//! Services are generic over their store trait so the same logic runs
//! against `PostgreSQL` in production and the in-memory stores in tests.

pub mod accounts;
pub mod catalog;
mod error;

pub use accounts::{AccountService, CredentialHasher, RegisterAccount};
pub use catalog::CatalogService;
pub use error::ServiceError;
