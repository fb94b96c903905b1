//! Argon2id password hashing.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::services::ServiceError;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hashes and verifies account passwords.
///
/// Holds a pre-computed hash of a throwaway password so a login for an
/// unknown email does the same work as one with a wrong password.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// Create a hasher with explicit Argon2id cost parameters.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::PasswordHash` if the dummy hash cannot be computed.
    pub fn new(params: Params) -> Result<Self, ServiceError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "fashionhub-dummy-password")?;
        Ok(Self { argon2, dummy_hash })
    }

    /// Create a hasher with the library's recommended parameters.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::PasswordHash` if the dummy hash cannot be computed.
    pub fn with_default_params() -> Result<Self, ServiceError> {
        Self::new(Params::default())
    }

    /// Hash a password with a fresh random salt, returning a PHC string.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::PasswordHash` if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String, ServiceError> {
        hash_with(&self.argon2, password)
    }

    /// Check a password against a stored PHC string.
    ///
    /// An unparseable stored hash never matches.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash).is_ok_and(|parsed| {
            self.argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Burn the same verification cost as [`Self::verify`] without a real hash.
    pub fn verify_dummy(&self, password: &str) {
        std::hint::black_box(self.verify(password, &self.dummy_hash));
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ServiceError::PasswordHash)
}
