//! FashionHub Core - Shared domain types.
//!
//! This crate provides the value types used across all FashionHub components:
//! - `storefront` - Catalog and account HTTP service
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Database encoding is available behind the `postgres`
//! feature so the types can be bound directly in sqlx queries.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, listing keys, prices,
//!   discounts and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
