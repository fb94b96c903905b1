//! Account store for database operations.
//!
//! Emails are stored normalised (trimmed, lower-case), so equality on the
//! column is a case-insensitive match on user input.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use fashionhub_core::{AccountId, Email};

use super::RepositoryError;
use crate::models::account::BASELINE_ACCOUNT_ID;
use crate::models::{Account, NewAccount};

/// Name of the primary key constraint on `accounts.id`.
const PRIMARY_KEY_CONSTRAINT: &str = "accounts_pkey";

/// Name of the unique constraint on `accounts.email`.
const EMAIL_CONSTRAINT: &str = "accounts_email_key";

/// Persistence for registered accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Whether an account is registered under this email.
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Look up an account by email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account together with its password hash.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Every account.
    async fn list(&self) -> Result<Vec<Account>, RepositoryError>;

    /// Accounts whose first or last name contains the term, ignoring case.
    async fn search_by_name(&self, term: &str) -> Result<Vec<Account>, RepositoryError>;

    /// Allocate the next id (`max + 1`, or [`BASELINE_ACCOUNT_ID`] when empty)
    /// and insert the account in one step.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::IdCollision` if a concurrent insert claimed
    /// the same id (the caller may retry), `RepositoryError::Conflict` if the
    /// email is already registered, and `RepositoryError::Database` for
    /// other failures.
    async fn insert_with_next_id(&self, account: &NewAccount) -> Result<Account, RepositoryError>;

    /// Verify the backing store answers.
    async fn health_check(&self) -> Result<(), RepositoryError>;
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i32,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone_number: row.phone_number,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

/// Map an insert failure onto the constraint it violated.
fn classify_insert_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        match db_err.constraint() {
            Some(PRIMARY_KEY_CONSTRAINT) => return RepositoryError::IdCollision,
            Some(EMAIL_CONSTRAINT) => {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            _ => {}
        }
    }
    RepositoryError::Database(err)
}

// =============================================================================
// PostgreSQL Store
// =============================================================================

/// `PostgreSQL`-backed account store.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a new account store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[tracing::instrument(skip(self, email))]
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(self, email))]
    async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, email, phone_number, created_at
            FROM accounts
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[tracing::instrument(skip(self, email))]
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let row: Option<CredentialRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, email, phone_number, created_at, password_hash
            FROM accounts
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| Account::try_from(r.account).map(|account| (account, r.password_hash)))
            .transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, email, phone_number, created_at
            FROM accounts
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Account>, RepositoryError> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, email, phone_number, created_at
            FROM accounts
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn search_by_name(&self, term: &str) -> Result<Vec<Account>, RepositoryError> {
        let rows: Vec<AccountRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, email, phone_number, created_at
            FROM accounts
            WHERE strpos(lower(first_name), lower($1)) > 0
               OR strpos(lower(last_name), lower($1)) > 0
            ORDER BY id
            ",
        )
        .bind(term.trim())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[tracing::instrument(skip(self, account))]
    async fn insert_with_next_id(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        // Allocation and insert share one statement; the primary key rejects
        // a racing writer that read the same MAX(id).
        let row: AccountRow = sqlx::query_as(
            r"
            INSERT INTO accounts
                (id, first_name, last_name, password_hash, email, phone_number, created_at)
            SELECT COALESCE(MAX(id) + 1, $1), $2, $3, $4, $5, $6, $7
            FROM accounts
            RETURNING id, first_name, last_name, email, phone_number, created_at
            ",
        )
        .bind(BASELINE_ACCOUNT_ID.as_i32())
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.password_hash)
        .bind(account.email.as_str())
        .bind(account.phone_number.as_deref())
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_insert_error)?;

        row.try_into()
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_invalid_email_is_corruption() {
        let row = AccountRow {
            id: 5,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            email: "not-an-email".to_string(),
            phone_number: None,
            created_at: Utc::now(),
        };

        let err = Account::try_from(row).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = classify_insert_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}
