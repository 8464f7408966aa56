//! In-memory store and gateway fakes for exercising the provisioning saga.

use crate::account::{Account, AccountError, CredentialBundle};
use crate::account::store::AccountStore;
use crate::gateway::{GatewayError, IdentityGateway};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
pub(crate) struct MemoryAccountStore {
    accounts: Mutex<Vec<Account>>,
}

impl MemoryAccountStore {
    pub(crate) fn get(&self, id: Uuid) -> Option<Account> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.id == id)
            .cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<Uuid, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();

        if accounts.iter().any(|account| account.email == email) {
            return Err(AccountError::Conflict);
        }

        let id = Uuid::new_v4();
        accounts.push(Account {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            credential: None,
        });

        Ok(id)
    }

    async fn attach_credential(
        &self,
        id: Uuid,
        bundle: &CredentialBundle,
    ) -> Result<(), AccountError> {
        let mut accounts = self.accounts.lock().unwrap();

        let account = accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or(AccountError::NotFound)?;

        account.credential = Some(bundle.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Account, AccountError> {
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|account| account.email == email)
            .cloned()
            .ok_or(AccountError::NotFound)
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeGateway {
    pub(crate) fail_create: bool,
    pub(crate) fail_issue: bool,
    pub(crate) create_calls: AtomicUsize,
    pub(crate) issue_calls: AtomicUsize,
}

impl FakeGateway {
    pub(crate) fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub(crate) fn failing_issue() -> Self {
        Self {
            fail_issue: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl IdentityGateway for FakeGateway {
    async fn create_consumer(&self, account_ref: &str) -> Result<String, GatewayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_create {
            return Err(GatewayError::Status {
                status: 502,
                message: "consumer creation failed".to_string(),
            });
        }

        Ok(format!("consumer-{account_ref}"))
    }

    async fn issue_credentials(
        &self,
        consumer_id: &str,
    ) -> Result<CredentialBundle, GatewayError> {
        self.issue_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_issue {
            return Err(GatewayError::Status {
                status: 502,
                message: "credential issuance failed".to_string(),
            });
        }

        Ok(CredentialBundle {
            consumer_id: consumer_id.to_string(),
            key: format!("key-{consumer_id}"),
            secret: format!("secret-{consumer_id}"),
            issued_at: 1_700_000_000,
        })
    }
}
