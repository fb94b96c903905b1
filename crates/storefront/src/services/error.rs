//! Service error taxonomy.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors returned by the catalog and account services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller input was rejected before any store access.
    #[error("{reason}")]
    Validation {
        /// Wire name of the offending field (e.g. `minPrice`).
        field: &'static str,
        reason: String,
    },

    /// The requested entity does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A uniqueness rule rejected the write.
    #[error("{field} already exists")]
    AlreadyExists { field: &'static str },

    /// Unknown email or wrong password; the two are never distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The backing store failed or timed out.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] RepositoryError),

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,
}

impl ServiceError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}
