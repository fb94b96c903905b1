//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{AccountStore, CatalogStore, PgAccountStore, PgCatalogStore, RepositoryError};
use crate::services::{AccountService, CatalogService, CredentialHasher};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog and account services. The stores behind them are trait objects so
/// tests can swap in the in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: CatalogService<dyn CatalogStore>,
    accounts: AccountService<dyn AccountStore>,
}

impl AppState {
    /// Create a new application state over arbitrary stores.
    ///
    /// # Arguments
    ///
    /// * `catalog_store` - Listing and category storage
    /// * `account_store` - Account storage
    /// * `hasher` - Password hasher
    #[must_use]
    pub fn new(
        catalog_store: Arc<dyn CatalogStore>,
        account_store: Arc<dyn AccountStore>,
        hasher: CredentialHasher,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(catalog_store),
                accounts: AccountService::new(account_store, Arc::new(hasher)),
            }),
        }
    }

    /// Create the production state backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool, hasher: CredentialHasher) -> Self {
        Self::new(
            Arc::new(PgCatalogStore::new(pool.clone())),
            Arc::new(PgAccountStore::new(pool)),
            hasher,
        )
    }

    /// Catalog query service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService<dyn CatalogStore> {
        &self.inner.catalog
    }

    /// Account identity service.
    #[must_use]
    pub fn accounts(&self) -> &AccountService<dyn AccountStore> {
        &self.inner.accounts
    }

    /// Check that both stores answer.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered.
    pub async fn ready(&self) -> Result<(), RepositoryError> {
        self.catalog().store().health_check().await?;
        self.accounts().store().health_check().await
    }
}
