//! Domain models for the storefront.
//!
//! These types represent validated domain objects separate from database row
//! types. Row decoding lives with each store adapter in [`crate::db`].

pub mod account;
pub mod listing;

pub use account::{Account, NewAccount};
pub use listing::{Category, Listing, ListingFilter, ListingRecord};
