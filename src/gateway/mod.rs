//! Capability interface over the API gateway's admin API.
//!
//! The registrar only ever talks to [`IdentityGateway`]; the one production
//! implementation ([`admin::AdminGateway`]) carries the transport details so
//! the saga can be exercised against an in-memory fake.

pub mod admin;

use crate::account::CredentialBundle;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from the gateway admin API.
///
/// Calls are single round trips with a bounded timeout and no internal
/// retry; a retried `create_consumer` after a transport timeout may create a
/// duplicate remote principal, so retry policy stays with the caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    Malformed(String),
}

/// Provisioning operations the account service needs from the gateway.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    /// Register a gateway-side principal tied to a local account reference.
    async fn create_consumer(&self, account_ref: &str) -> Result<String, GatewayError>;

    /// Issue signing credentials for a previously created consumer.
    async fn issue_credentials(&self, consumer_id: &str)
        -> Result<CredentialBundle, GatewayError>;
}
