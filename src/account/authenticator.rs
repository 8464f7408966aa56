//! Login: load, verify, mint.

use crate::account::store::AccountStore;
use crate::account::token::{self, TOKEN_TTL};
use crate::account::{password::Hasher, valid_email, AccountError, IssuedToken};
use std::sync::Arc;
use tracing::{instrument, warn};

pub struct Authenticator {
    store: Arc<dyn AccountStore>,
    hasher: Hasher,
}

impl Authenticator {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            store,
            hasher: Hasher::new(),
        }
    }

    /// Authenticate an account and mint a fresh token from its persisted
    /// gateway credentials.
    ///
    /// # Errors
    ///
    /// An unknown email and a wrong password both return
    /// `AccountError::NotFound`, the same variant with the same message, so
    /// a caller can never tell which field was wrong. An account whose
    /// provisioning never completed is `Unprovisioned`, never `NotFound`.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AccountError> {
        if !valid_email(email) {
            return Err(AccountError::Validation("invalid email address"));
        }

        if password.is_empty() {
            return Err(AccountError::Validation("password must not be empty"));
        }

        let account = self.store.find_by_email(email).await?;

        if !self.hasher.verify(password, &account.password_hash) {
            return Err(AccountError::NotFound);
        }

        let Some(bundle) = account.credential else {
            warn!(account_id = %account.id, "login against unprovisioned account");
            return Err(AccountError::Unprovisioned(account.id));
        };

        let token = token::issue(&bundle.consumer_id, &bundle.secret, TOKEN_TTL)?;

        Ok(IssuedToken {
            account_id: account.id,
            token,
        })
    }
}
