//! Account domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fashionhub_core::{AccountId, Email};

/// Identifier handed out when no account exists yet.
///
/// The original deployment was seeded with accounts 1-4, so fresh
/// allocation starts at 5.
pub const BASELINE_ACCOUNT_ID: AccountId = AccountId::new(5);

/// A registered shopper (domain type).
///
/// Never carries the password hash; credential checks go through
/// [`crate::db::AccountStore::find_credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Application-allocated account id.
    #[serde(rename = "userId")]
    pub id: AccountId,
    /// Given name, trimmed.
    pub first_name: String,
    /// Family name, trimmed.
    pub last_name: String,
    /// Normalised (trimmed, lower-case) email.
    pub email: Email,
    /// Optional contact number.
    pub phone_number: Option<String>,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// First and last name joined with a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An account ready to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Materialise the stored account once an id has been allocated.
    #[must_use]
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            created_at: self.created_at,
        }
    }
}
