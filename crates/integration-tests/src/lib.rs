//! Integration tests for the FashionHub storefront.
//!
//! These run against a live server backed by a migrated and seeded database
//! and are `#[ignore]`d by default.
//!
//! ```bash
//! cargo run -p fashionhub-cli -- migrate
//! cargo run -p fashionhub-cli -- seed catalog -f crates/cli/seed/catalog.yaml
//! cargo run -p fashionhub-storefront &
//! cargo test -p fashionhub-integration-tests -- --ignored
//! ```
//!
//! Set `STOREFRONT_BASE_URL` to point at a server other than
//! `http://localhost:8080`.

use reqwest::Client;
use serde_json::Value;

/// Base URL for the storefront API.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// HTTP client plus base URL.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context for the configured server.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: storefront_base_url(),
        }
    }

    /// Absolute URL for a path such as `/api/products`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a path and decode the JSON body.
    ///
    /// # Errors
    ///
    /// Returns the request or decode error.
    pub async fn get_json(&self, path: &str) -> reqwest::Result<(reqwest::StatusCode, Value)> {
        let resp = self.client.get(self.url(path)).send().await?;
        let status = resp.status();
        Ok((status, resp.json().await?))
    }

    /// POST a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns the request or decode error.
    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
    ) -> reqwest::Result<(reqwest::StatusCode, Value)> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        Ok((status, resp.json().await?))
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// An email address no earlier run has registered.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", uuid::Uuid::new_v4().simple())
}
