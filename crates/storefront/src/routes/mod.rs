//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (both stores)
//!
//! # Products
//! GET  /api/products                   - All listings
//! GET  /api/products/{id}              - Listing detail
//! GET  /api/products/category/{id}     - Listings in a category
//! GET  /api/products/search?name=      - Name/description search
//! GET  /api/products/brand/{brand}     - Listings of a brand
//! GET  /api/products/price-range?minPrice=&maxPrice=
//! GET  /api/products/discounted        - Discounted, largest first
//! GET  /api/products/available         - In stock
//! GET  /api/products/latest            - Newest first
//! GET  /api/products/brands            - Distinct brands
//! GET  /api/products/sizes             - Distinct sizes
//!
//! # Categories
//! GET  /api/categories                 - All categories
//! GET  /api/categories/{id}            - Category detail
//! GET  /api/categories/search?name=    - Category name search
//!
//! # Auth
//! POST /api/auth/register              - Register an account
//! POST /api/auth/login                 - Check credentials
//! GET  /api/auth/check-email?email=    - Email availability
//!
//! # Users
//! GET  /api/users                      - Account directory
//! GET  /api/users/{id}                 - Account by id
//! GET  /api/users/email/{email}        - Account by email
//! GET  /api/users/search?name=         - Name search
//! GET  /api/users/exists/{email}       - Email registered?
//! ```

pub mod auth;
pub mod categories;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/search", get(products::search))
        .route("/price-range", get(products::price_range))
        .route("/discounted", get(products::discounted))
        .route("/available", get(products::available))
        .route("/latest", get(products::latest))
        .route("/brands", get(products::brands))
        .route("/sizes", get(products::sizes))
        .route("/category/{category_id}", get(products::by_category))
        .route("/brand/{brand}", get(products::by_brand))
        .route("/{id}", get(products::show))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/search", get(categories::search))
        .route("/{id}", get(categories::show))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/check-email", get(auth::check_email))
}

/// Create the user directory routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/search", get(users::search))
        .route("/email/{email}", get(users::by_email))
        .route("/exists/{email}", get(users::exists))
        .route("/{id}", get(users::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/auth", auth_routes())
        .nest("/api/users", user_routes())
}

/// Build the CORS policy for the web frontend.
///
/// # Errors
///
/// Returns an error if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true))
}

/// Assemble the application: routes, request IDs, tracing, and CORS.
///
/// Sentry layers are added by the binary, outside this stack.
///
/// # Errors
///
/// Returns an error if `cors_origin` is not a valid header value.
pub fn app(state: AppState, cors_origin: &str) -> Result<Router, header::InvalidHeaderValue> {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = tracing::field::Empty,
        )
    });

    Ok(routes()
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(trace)
        .layer(cors_layer(cors_origin)?))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if either store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.ready().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;
    use crate::db::{MemoryAccountStore, MemoryCatalogStore};
    use crate::models::{Category, Listing};
    use crate::services::accounts::password::tests::cheap_hasher;

    pub(crate) const ORIGIN: &str = "http://localhost:3000";

    /// Router over in-memory stores.
    pub(crate) fn test_app(categories: Vec<Category>, listings: Vec<Listing>) -> Router {
        let state = AppState::new(
            Arc::new(MemoryCatalogStore::with_catalog(categories, listings)),
            Arc::new(MemoryAccountStore::new()),
            cheap_hasher(),
        );
        app(state, ORIGIN).unwrap()
    }

    pub(crate) async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub(crate) async fn post_json(
        app: &Router,
        uri: &str,
        body: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(Vec::new(), Vec::new());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_with_memory_stores() {
        let app = test_app(Vec::new(), Vec::new());
        let (status, _) = get_json(&app, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let app = test_app(Vec::new(), Vec::new());
        let response = app
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_cors_allows_frontend_origin() {
        let app = test_app(Vec::new(), Vec::new());
        let response = app
            .oneshot(
                Request::get("/api/products")
                    .header(header::ORIGIN, ORIGIN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            ORIGIN
        );
    }

    #[test]
    fn test_invalid_cors_origin() {
        assert!(cors_layer("bad\norigin").is_err());
    }
}
