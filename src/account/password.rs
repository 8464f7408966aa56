//! Password hashing with Argon2id.
//!
//! Digests are PHC strings, so the algorithm, version, cost parameters and
//! salt travel inside the stored hash and the work factor can be raised
//! later without invalidating existing hashes.

use crate::account::AccountError;
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Adaptive-cost password hasher.
///
/// Defaults to the OWASP-recommended Argon2id parameters
/// (m=19456 KiB, t=2, p=1).
#[derive(Debug, Clone)]
pub struct Hasher {
    params: Params,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    #[must_use]
    pub fn new() -> Self {
        // m=19456 (19 MiB), t=2, p=1; constants are valid by construction
        let params = Params::new(19456, 2, 1, None).expect("valid Argon2 parameters");

        Self { params }
    }

    /// Hash a plaintext password into a PHC string with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Store` if the hashing primitive fails.
    pub fn hash(&self, password: &str) -> Result<String, AccountError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let digest = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|error| AccountError::Store(format!("password hashing failed: {error}")))?;

        Ok(digest.to_string())
    }

    /// Verify a plaintext password against a stored digest.
    ///
    /// A malformed digest is treated as a non-match, never an error.
    #[must_use]
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}
