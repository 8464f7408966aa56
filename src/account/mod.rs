//! Account domain: records, errors and the registration/login flows.

pub mod authenticator;
pub mod password;
pub mod registrar;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

use crate::gateway::GatewayError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub(crate) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Signing credentials issued by the gateway for one consumer.
/// Persisted as a whole or not at all; a partially-populated bundle never
/// reaches the store.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialBundle {
    pub consumer_id: String,
    pub key: String,
    pub secret: String,
    pub issued_at: i64,
}

// Keep the signing secret out of debug output and spans.
impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("consumer_id", &self.consumer_id)
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// An account row as persisted.
///
/// `credential` is `None` between the local insert and a successful gateway
/// enrollment; such an account exists but cannot log in yet.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub credential: Option<CredentialBundle>,
}

/// Everything that can go wrong while registering or logging in.
///
/// `NotFound` carries the same message for an unknown email and for a wrong
/// password so responses never reveal which field was wrong.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("account already exists")]
    Conflict,

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The account row exists but gateway enrollment never completed.
    #[error("account {0} has no gateway credentials")]
    Unprovisioned(Uuid),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("storage error: {0}")]
    Store(String),
}

/// Result of a successful registration or login.
#[derive(Debug)]
pub struct IssuedToken {
    pub account_id: Uuid,
    pub token: String,
}
