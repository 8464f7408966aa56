//! Account creation: the provisioning saga.
//!
//! The sequence is insert → create consumer → issue credentials → attach
//! bundle → mint token, with no distributed transaction around it. A
//! failure after the insert leaves a durable account row without gateway
//! credentials; such an account cannot log in until provisioning is
//! repaired out of band.

use crate::account::store::AccountStore;
use crate::account::token::{self, TOKEN_TTL};
use crate::account::{password::Hasher, valid_email, AccountError, IssuedToken};
use crate::gateway::IdentityGateway;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct Registrar {
    store: Arc<dyn AccountStore>,
    gateway: Arc<dyn IdentityGateway>,
    hasher: Hasher,
}

impl Registrar {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, gateway: Arc<dyn IdentityGateway>) -> Self {
        Self {
            store,
            gateway,
            hasher: Hasher::new(),
        }
    }

    /// Create an account, enroll it with the gateway and mint its first
    /// token.
    ///
    /// # Errors
    ///
    /// * `Validation` — malformed email or empty password, before any side
    ///   effect.
    /// * `Conflict` — the email is already registered; no gateway call has
    ///   been made.
    /// * `Gateway`/`Store`/`Signing` — a later saga step failed; the local
    ///   row may already exist without credentials.
    #[instrument(skip_all)]
    pub async fn register(&self, email: &str, password: &str) -> Result<IssuedToken, AccountError> {
        if !valid_email(email) {
            return Err(AccountError::Validation("invalid email address"));
        }

        if password.is_empty() {
            return Err(AccountError::Validation("password must not be empty"));
        }

        let password_hash = self.hasher.hash(password)?;

        let id = self.store.insert(email, &password_hash).await?;

        debug!(account_id = %id, "account inserted, enrolling with gateway");

        // From here on a failure orphans the row: no compensating delete.
        let consumer_id = match self.gateway.create_consumer(&id.to_string()).await {
            Ok(consumer_id) => consumer_id,
            Err(error) => {
                warn!(account_id = %id, "account left without gateway consumer: {error}");
                return Err(error.into());
            }
        };

        let bundle = match self.gateway.issue_credentials(&consumer_id).await {
            Ok(bundle) => bundle,
            Err(error) => {
                warn!(account_id = %id, "account left without gateway credentials: {error}");
                return Err(error.into());
            }
        };

        self.store.attach_credential(id, &bundle).await?;

        let token = token::issue(&bundle.consumer_id, &bundle.secret, TOKEN_TTL)?;

        Ok(IssuedToken {
            account_id: id,
            token,
        })
    }
}
