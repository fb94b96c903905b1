//! Product route handlers.

use axum::{
    Json,
    extract::State,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use fashionhub_core::CategoryId;

use crate::error::Result;
use crate::extract::{PathParam, QueryParams};
use crate::models::{Listing, ListingRecord};
use crate::state::AppState;

/// `?name=` search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

/// `?minPrice=&maxPrice=` query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRangeQuery {
    pub min_price: Decimal,
    pub max_price: Decimal,
}

fn records(listings: Vec<Listing>) -> Json<Vec<ListingRecord>> {
    Json(listings.into_iter().map(ListingRecord::from).collect())
}

/// All listings.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ListingRecord>>> {
    Ok(records(state.catalog().list_all().await?))
}

/// Listing detail.
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<Json<ListingRecord>> {
    let listing = state.catalog().get_by_id(&id).await?;
    Ok(Json(listing.into()))
}

/// Listings in a category.
pub async fn by_category(
    State(state): State<AppState>,
    PathParam(category_id): PathParam<i32>,
) -> Result<Json<Vec<ListingRecord>>> {
    let listings = state
        .catalog()
        .list_by_category(CategoryId::new(category_id))
        .await?;
    Ok(records(listings))
}

/// Name/description search.
pub async fn search(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Vec<ListingRecord>>> {
    Ok(records(state.catalog().search(&query.name).await?))
}

/// Listings of one brand.
pub async fn by_brand(
    State(state): State<AppState>,
    PathParam(brand): PathParam<String>,
) -> Result<Json<Vec<ListingRecord>>> {
    Ok(records(state.catalog().list_by_brand(&brand).await?))
}

/// Listings within a price band.
pub async fn price_range(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PriceRangeQuery>,
) -> Result<Json<Vec<ListingRecord>>> {
    let listings = state
        .catalog()
        .list_by_price_range(query.min_price, query.max_price)
        .await?;
    Ok(records(listings))
}

/// Discounted listings, largest discount first.
pub async fn discounted(State(state): State<AppState>) -> Result<Json<Vec<ListingRecord>>> {
    Ok(records(state.catalog().list_discounted().await?))
}

/// Listings in stock.
pub async fn available(State(state): State<AppState>) -> Result<Json<Vec<ListingRecord>>> {
    Ok(records(state.catalog().list_available().await?))
}

/// Newest listings first.
pub async fn latest(State(state): State<AppState>) -> Result<Json<Vec<ListingRecord>>> {
    Ok(records(state.catalog().list_latest().await?))
}

/// Distinct brands.
pub async fn brands(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.catalog().list_all_brands().await?))
}

/// Distinct sizes.
pub async fn sizes(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.catalog().list_all_sizes().await?))
}
