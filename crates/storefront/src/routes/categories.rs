//! Category route handlers.

use axum::{
    Json,
    extract::State,
};

use fashionhub_core::CategoryId;

use super::products::SearchQuery;
use crate::error::Result;
use crate::extract::{PathParam, QueryParams};
use crate::models::Category;
use crate::state::AppState;

/// All categories.
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().list_categories().await?))
}

/// Category detail.
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<i32>,
) -> Result<Json<Category>> {
    Ok(Json(state.catalog().get_category(CategoryId::new(id)).await?))
}

/// Category name search.
pub async fn search(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog().search_categories(&query.name).await?))
}
