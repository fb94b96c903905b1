//! Catalog endpoints against a running storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database seeded with `crates/cli/seed/catalog.yaml`
//! - The storefront running (cargo run -p fashionhub-storefront)

use fashionhub_integration_tests::TestContext;
use reqwest::StatusCode;

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_health() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/health/ready"))
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_product_listing_and_detail() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get_json("/api/products").await.expect("list products");
    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().expect("array body");
    assert!(!products.is_empty());

    let (status, body) = ctx.get_json("/api/products/P001").await.expect("get product");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["productId"], "P001");
    assert_eq!(body["categoryName"], "Men's Clothing");

    let (status, body) = ctx.get_json("/api/products/NOPE").await.expect("missing product");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_discounted_ordering() {
    let ctx = TestContext::new();

    let (_, body) = ctx
        .get_json("/api/products/discounted")
        .await
        .expect("discounted products");

    let discounts: Vec<i64> = body
        .as_array()
        .expect("array body")
        .iter()
        .filter_map(|p| p["discountPercent"].as_i64())
        .collect();
    assert!(discounts.iter().all(|d| *d > 0));
    assert!(discounts.is_sorted_by(|a, b| a >= b));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_price_range_rejects_inverted_bounds() {
    let ctx = TestContext::new();

    let (status, _) = ctx
        .get_json("/api/products/price-range?minPrice=20&maxPrice=60")
        .await
        .expect("price range");
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .get_json("/api/products/price-range?minPrice=60&maxPrice=20")
        .await
        .expect("inverted price range");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded database"]
async fn test_categories() {
    let ctx = TestContext::new();

    let (status, body) = ctx.get_json("/api/categories").await.expect("categories");
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().is_some_and(|c| !c.is_empty()));

    let (status, body) = ctx
        .get_json("/api/categories/search?name=shoe")
        .await
        .expect("category search");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["categoryName"], "Shoes");
}
