//! Account identity service: registration, login, and lookups.
//!
//! # Registration
//!
//! 1. Validate names, email, and password length (no store access on failure)
//! 2. Normalise the email (trim, lower-case) and check it is free
//! 3. Hash the password with Argon2id
//! 4. Insert with the next free id, retrying if a concurrent registration
//!    claimed the same id
//!
//! # Login
//!
//! Unknown email, wrong password, and a stored hash that does not parse all
//! produce [`ServiceError::InvalidCredentials`].

pub(crate) mod password;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use fashionhub_core::{AccountId, Email, EmailError};

pub use password::{CredentialHasher, MIN_PASSWORD_LENGTH};

use super::ServiceError;
use crate::db::{AccountStore, RepositoryError};
use crate::models::{Account, NewAccount};

/// How many times registration retries after losing an id race.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Longest first or last name (`accounts.first_name` is `VARCHAR(100)`).
pub const MAX_NAME_LENGTH: usize = 100;

/// Longest phone number (`accounts.phone_number` is `VARCHAR(32)`).
pub const MAX_PHONE_LENGTH: usize = 32;

/// Registration form input.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

impl fmt::Debug for RegisterAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterAccount")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Account registration and authentication.
pub struct AccountService<S: ?Sized> {
    store: Arc<S>,
    hasher: Arc<CredentialHasher>,
}

impl<S: ?Sized> Clone for AccountService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<S: AccountStore + ?Sized> AccountService<S> {
    /// Create a service over the given store.
    #[must_use]
    pub const fn new(store: Arc<S>, hasher: Arc<CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for missing or malformed input,
    /// `ServiceError::AlreadyExists` if the email is taken, and
    /// `ServiceError::StorageUnavailable` if the store fails or every
    /// allocation attempt collides.
    #[instrument(skip_all)]
    pub async fn register(&self, input: RegisterAccount) -> Result<Account, ServiceError> {
        let first_name = required(&input.first_name, "firstName", "First name is required")?;
        at_most(first_name, MAX_NAME_LENGTH, "firstName", "First name")?;
        let last_name = required(&input.last_name, "lastName", "Last name is required")?;
        at_most(last_name, MAX_NAME_LENGTH, "lastName", "Last name")?;
        required(&input.email, "email", "Email is required")?;
        let email = Email::parse(&input.email)
            .map_err(|e| ServiceError::validation("email", email_reason(&e)))?;
        if input.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ServiceError::validation(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
            ));
        }

        let phone_number = input
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());
        if let Some(phone) = phone_number {
            at_most(phone, MAX_PHONE_LENGTH, "phoneNumber", "Phone number")?;
        }

        if self.store.email_exists(&email).await? {
            tracing::info!("registration rejected: email already registered");
            return Err(ServiceError::AlreadyExists { field: "email" });
        }

        let new_account = NewAccount {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            email,
            password_hash: self.hasher.hash(&input.password)?,
            phone_number: phone_number.map(str::to_owned),
            created_at: Utc::now(),
        };

        let mut attempt = 1;
        loop {
            match self.store.insert_with_next_id(&new_account).await {
                Ok(account) => {
                    tracing::info!(account_id = %account.id, "account registered");
                    return Ok(account);
                }
                Err(RepositoryError::Conflict(_)) => {
                    return Err(ServiceError::AlreadyExists { field: "email" });
                }
                Err(RepositoryError::IdCollision) if attempt < MAX_ALLOCATION_ATTEMPTS => {
                    tracing::debug!(attempt, "account id taken concurrently, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if either field is blank and
    /// `ServiceError::InvalidCredentials` for any other mismatch.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, ServiceError> {
        required(email, "email", "Email is required")?;
        required(password, "password", "Password is required")?;

        let Ok(email) = Email::parse(email) else {
            self.hasher.verify_dummy(password);
            return Err(ServiceError::InvalidCredentials);
        };

        match self.store.find_credentials(&email).await? {
            Some((account, hash)) if self.hasher.verify(password, &hash) => {
                tracing::info!(account_id = %account.id, "login succeeded");
                Ok(account)
            }
            Some((account, _)) => {
                tracing::info!(account_id = %account.id, "login failed");
                Err(ServiceError::InvalidCredentials)
            }
            None => {
                self.hasher.verify_dummy(password);
                tracing::info!("login failed");
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    /// Whether an account exists for this email (case and surrounding
    /// whitespace ignored). Malformed input is simply `false`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError> {
        match Email::parse(email) {
            Ok(email) => Ok(self.store.email_exists(&email).await?),
            Err(_) => Ok(false),
        }
    }

    /// Whether the email is free for registration.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn email_available(&self, email: &str) -> Result<bool, ServiceError> {
        Ok(!self.exists_by_email(email).await?)
    }

    /// Look up an account by email.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>, ServiceError> {
        match Email::parse(email) {
            Ok(email) => Ok(self.store.find_by_email(&email).await?),
            Err(_) => Ok(None),
        }
    }

    /// Look up an account by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, ServiceError> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// All accounts, by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, ServiceError> {
        let mut accounts = self.store.list().await?;
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }

    /// Accounts whose first or last name contains `term`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::StorageUnavailable` if the store fails.
    pub async fn search_accounts(&self, term: &str) -> Result<Vec<Account>, ServiceError> {
        let mut accounts = self.store.search_by_name(term.trim()).await?;
        accounts.sort_by_key(|a| a.id);
        Ok(accounts)
    }
}

/// Trim a required field, rejecting blank input.
fn required<'a>(
    value: &'a str,
    field: &'static str,
    reason: &str,
) -> Result<&'a str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(field, reason));
    }
    Ok(trimmed)
}

/// Reject values longer than the column holding them.
fn at_most(value: &str, max: usize, field: &'static str, label: &str) -> Result<(), ServiceError> {
    if value.chars().count() > max {
        return Err(ServiceError::validation(
            field,
            format!("{label} must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn email_reason(err: &EmailError) -> String {
    match err {
        EmailError::TooLong { .. } => format!("Email must be at most {} characters", Email::MAX_LENGTH),
        _ => "Invalid email format".to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::password::tests::cheap_hasher;
    use super::*;
    use crate::db::MemoryAccountStore;

    fn service() -> AccountService<MemoryAccountStore> {
        AccountService::new(
            Arc::new(MemoryAccountStore::new()),
            Arc::new(cheap_hasher()),
        )
    }

    fn form(email: &str) -> RegisterAccount {
        RegisterAccount {
            first_name: " Ann ".to_string(),
            last_name: "Lee".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            phone_number: Some("  ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let svc = service();
        let account = svc.register(form("  Ann@Example.COM ")).await.unwrap();

        assert_eq!(account.id, AccountId::new(5));
        assert_eq!(account.first_name, "Ann");
        assert_eq!(account.email.as_str(), "ann@example.com");
        assert!(account.phone_number.is_none());

        let logged_in = svc.login("ANN@example.com", "secret1").await.unwrap();
        assert_eq!(logged_in.id, account.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let svc = service();
        svc.register(form("ann@example.com")).await.unwrap();

        let wrong_password = svc.login("ann@example.com", "nope-nope").await.unwrap_err();
        let unknown_email = svc.login("bob@example.com", "secret1").await.unwrap_err();
        let malformed = svc.login("bob", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert!(matches!(unknown_email, ServiceError::InvalidCredentials));
        assert!(matches!(malformed, ServiceError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let svc = service();

        assert!(matches!(
            svc.login(" ", "secret1").await.unwrap_err(),
            ServiceError::Validation { field: "email", .. }
        ));
        assert!(matches!(
            svc.login("ann@example.com", "   ").await.unwrap_err(),
            ServiceError::Validation { field: "password", .. }
        ));
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let svc = service();

        let mut input = form("ann@example.com");
        input.first_name = String::new();
        input.password = String::new();
        assert!(matches!(
            svc.register(input).await.unwrap_err(),
            ServiceError::Validation { field: "firstName", .. }
        ));

        let mut input = form("ann@example.com");
        input.last_name = "  ".to_string();
        assert!(matches!(
            svc.register(input).await.unwrap_err(),
            ServiceError::Validation { field: "lastName", .. }
        ));

        assert!(matches!(
            svc.register(form("not-an-email")).await.unwrap_err(),
            ServiceError::Validation { field: "email", .. }
        ));

        let mut input = form("ann@example.com");
        input.password = "12345".to_string();
        assert!(matches!(
            svc.register(input).await.unwrap_err(),
            ServiceError::Validation { field: "password", .. }
        ));

        assert!(svc.store().is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_overlong_fields() {
        let svc = service();

        let mut input = form("ann@example.com");
        input.first_name = "A".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            svc.register(input).await.unwrap_err(),
            ServiceError::Validation { field: "firstName", .. }
        ));

        let mut input = form("ann@example.com");
        input.last_name = "L".repeat(MAX_NAME_LENGTH + 1);
        assert!(matches!(
            svc.register(input).await.unwrap_err(),
            ServiceError::Validation { field: "lastName", .. }
        ));

        let mut input = form("ann@example.com");
        input.phone_number = Some("9".repeat(MAX_PHONE_LENGTH + 1));
        assert!(matches!(
            svc.register(input).await.unwrap_err(),
            ServiceError::Validation { field: "phoneNumber", .. }
        ));

        assert!(svc.store().is_empty());

        let mut input = form("ann@example.com");
        input.first_name = "A".repeat(MAX_NAME_LENGTH);
        input.phone_number = Some(format!(" {} ", "9".repeat(MAX_PHONE_LENGTH)));
        let account = svc.register(input).await.unwrap();
        assert_eq!(account.phone_number.as_deref().map(str::len), Some(MAX_PHONE_LENGTH));
    }

    #[tokio::test]
    async fn test_duplicate_email_ignores_case() {
        let svc = service();
        svc.register(form("ann@example.com")).await.unwrap();

        let err = svc.register(form("ANN@example.com ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyExists { field: "email" }));
        assert_eq!(svc.store().len(), 1);
    }

    #[tokio::test]
    async fn test_exists_by_email() {
        let svc = service();
        svc.register(form("a@b.com")).await.unwrap();

        assert!(svc.exists_by_email("A@B.COM").await.unwrap());
        assert!(svc.exists_by_email(" a@b.com ").await.unwrap());
        assert!(!svc.exists_by_email("c@b.com").await.unwrap());
        assert!(!svc.exists_by_email("garbage").await.unwrap());
        assert!(!svc.email_available("a@b.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_get_distinct_ids() {
        let svc = service();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.register(form(&format!("user{i}@example.com"))).await })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            let account = handle.await.unwrap().unwrap();
            assert!(account.id.as_i32() >= 5);
            ids.insert(account.id);
        }
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test]
    async fn test_lookups() {
        let svc = service();
        let ann = svc.register(form("ann@example.com")).await.unwrap();
        let mut bob = form("bob@example.com");
        bob.first_name = "Bob".to_string();
        bob.last_name = "Annerly".to_string();
        let bob = svc.register(bob).await.unwrap();

        assert_eq!(svc.get_by_id(bob.id).await.unwrap().unwrap().email, bob.email);
        assert!(svc.get_by_id(AccountId::new(99)).await.unwrap().is_none());
        assert_eq!(
            svc.get_by_email("ANN@example.com").await.unwrap().unwrap().id,
            ann.id
        );

        let ids: Vec<_> = svc.list_accounts().await.unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![ann.id, bob.id]);

        let found = svc.search_accounts("ann").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    /// Reports an id collision for the first `collisions` inserts.
    struct CollidingStore {
        inner: MemoryAccountStore,
        collisions: AtomicUsize,
    }

    #[async_trait]
    impl AccountStore for CollidingStore {
        async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
            self.inner.email_exists(email).await
        }
        async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
            self.inner.find_by_email(email).await
        }
        async fn find_credentials(
            &self,
            email: &Email,
        ) -> Result<Option<(Account, String)>, RepositoryError> {
            self.inner.find_credentials(email).await
        }
        async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
            self.inner.find_by_id(id).await
        }
        async fn list(&self) -> Result<Vec<Account>, RepositoryError> {
            self.inner.list().await
        }
        async fn search_by_name(&self, term: &str) -> Result<Vec<Account>, RepositoryError> {
            self.inner.search_by_name(term).await
        }
        async fn insert_with_next_id(
            &self,
            account: &NewAccount,
        ) -> Result<Account, RepositoryError> {
            let remaining = self.collisions.load(Ordering::SeqCst);
            if remaining > 0 {
                self.collisions.store(remaining - 1, Ordering::SeqCst);
                return Err(RepositoryError::IdCollision);
            }
            self.inner.insert_with_next_id(account).await
        }
        async fn health_check(&self) -> Result<(), RepositoryError> {
            Ok(())
        }
    }

    fn colliding(collisions: usize) -> AccountService<CollidingStore> {
        AccountService::new(
            Arc::new(CollidingStore {
                inner: MemoryAccountStore::new(),
                collisions: AtomicUsize::new(collisions),
            }),
            Arc::new(cheap_hasher()),
        )
    }

    #[tokio::test]
    async fn test_id_collision_is_retried() {
        let svc = colliding(MAX_ALLOCATION_ATTEMPTS - 1);
        let account = svc.register(form("ann@example.com")).await.unwrap();
        assert_eq!(account.id, AccountId::new(5));
    }

    #[tokio::test]
    async fn test_id_collision_gives_up() {
        let svc = colliding(MAX_ALLOCATION_ATTEMPTS);
        let err = svc.register(form("ann@example.com")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::StorageUnavailable(RepositoryError::IdCollision)
        ));
    }
}
