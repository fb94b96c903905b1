//! Core types for FashionHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod discount;
pub mod email;
pub mod id;
pub mod listing_key;
pub mod price;

pub use discount::{DiscountError, DiscountPercent};
pub use email::{Email, EmailError};
pub use id::*;
pub use listing_key::{ListingKey, ListingKeyError};
pub use price::{Price, PriceError};
