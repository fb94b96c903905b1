//! FashionHub Storefront library.
//!
//! Catalog browsing and account identity over a JSON API. The crate is a
//! library so the router can be exercised in tests against in-memory stores.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
