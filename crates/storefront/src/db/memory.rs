//! In-memory store implementations for tests and local development.
//!
//! Both stores honour the same contracts as their `PostgreSQL` counterparts,
//! including id allocation and email uniqueness for accounts.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use fashionhub_core::{AccountId, CategoryId, Email};

use super::{AccountStore, CatalogStore, RepositoryError};
use crate::models::account::BASELINE_ACCOUNT_ID;
use crate::models::{Account, Category, Listing, ListingFilter, NewAccount};

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Default)]
struct CatalogData {
    listings: Vec<Listing>,
    categories: Vec<Category>,
}

/// In-memory catalog store.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    data: RwLock<CatalogData>,
}

impl MemoryCatalogStore {
    /// Create a catalog holding the given categories and listings.
    #[must_use]
    pub fn with_catalog(categories: Vec<Category>, listings: Vec<Listing>) -> Self {
        Self {
            data: RwLock::new(CatalogData {
                listings,
                categories,
            }),
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn find_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError> {
        let data = self.data.read();
        Ok(data
            .listings
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect())
    }

    async fn distinct_brands(&self) -> Result<Vec<String>, RepositoryError> {
        let data = self.data.read();
        Ok(data
            .listings
            .iter()
            .filter_map(|l| l.brand.clone())
            .collect())
    }

    async fn distinct_sizes(&self) -> Result<Vec<String>, RepositoryError> {
        let data = self.data.read();
        Ok(data
            .listings
            .iter()
            .flat_map(|l| l.sizes.iter().cloned())
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let mut categories = self.data.read().categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let data = self.data.read();
        Ok(data.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn search_categories(&self, term: &str) -> Result<Vec<Category>, RepositoryError> {
        let needle = term.trim().to_lowercase();
        let mut matches: Vec<Category> = self
            .data
            .read()
            .categories
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by_key(|c| c.id);
        Ok(matches)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password_hash: String,
}

/// In-memory account store.
///
/// Id allocation and insert happen under one write lock, so concurrent
/// registrations never observe the same `max + 1`.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<BTreeMap<AccountId, StoredAccount>>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Whether no accounts are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self
            .accounts
            .read()
            .values()
            .any(|s| s.account.email == *email))
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|s| s.account.email == *email)
            .map(|s| s.account.clone()))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        Ok(self
            .accounts
            .read()
            .values()
            .find(|s| s.account.email == *email)
            .map(|s| (s.account.clone(), s.password_hash.clone())))
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.accounts.read().get(&id).map(|s| s.account.clone()))
    }

    async fn list(&self) -> Result<Vec<Account>, RepositoryError> {
        Ok(self
            .accounts
            .read()
            .values()
            .map(|s| s.account.clone())
            .collect())
    }

    async fn search_by_name(&self, term: &str) -> Result<Vec<Account>, RepositoryError> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .accounts
            .read()
            .values()
            .filter(|s| {
                s.account.first_name.to_lowercase().contains(&needle)
                    || s.account.last_name.to_lowercase().contains(&needle)
            })
            .map(|s| s.account.clone())
            .collect())
    }

    async fn insert_with_next_id(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        let mut accounts = self.accounts.write();

        if accounts.values().any(|s| s.account.email == account.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let id = match accounts.keys().next_back() {
            Some(max) => {
                let next = max.as_i32().checked_add(1).ok_or_else(|| {
                    RepositoryError::DataCorruption("account id space exhausted".to_owned())
                })?;
                AccountId::new(next)
            }
            None => BASELINE_ACCOUNT_ID,
        };

        let stored = StoredAccount {
            account: account.clone().into_account(id),
            password_hash: account.password_hash.clone(),
        };
        let created = stored.account.clone();
        accounts.insert(id, stored);
        Ok(created)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_string(),
            phone_number: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_first_account_gets_baseline_id() {
        let store = MemoryAccountStore::new();
        let account = store
            .insert_with_next_id(&new_account("a@example.com"))
            .await
            .unwrap();
        assert_eq!(account.id, BASELINE_ACCOUNT_ID);
    }

    #[tokio::test]
    async fn test_ids_increase_from_max() {
        let store = MemoryAccountStore::new();
        store
            .insert_with_next_id(&new_account("a@example.com"))
            .await
            .unwrap();
        let second = store
            .insert_with_next_id(&new_account("b@example.com"))
            .await
            .unwrap();
        assert_eq!(second.id, AccountId::new(6));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryAccountStore::new();
        store
            .insert_with_next_id(&new_account("a@example.com"))
            .await
            .unwrap();
        let err = store
            .insert_with_next_id(&new_account("A@Example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_credentials_include_hash() {
        let store = MemoryAccountStore::new();
        store
            .insert_with_next_id(&new_account("a@example.com"))
            .await
            .unwrap();

        let (account, hash) = store
            .find_credentials(&Email::parse("a@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.first_name, "Ann");
        assert_eq!(hash, "hash");
    }
}
