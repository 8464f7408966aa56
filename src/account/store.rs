//! Account persistence.
//!
//! Every operation is a single row and a single statement; there is no
//! cross-call transaction between `insert`, gateway provisioning and
//! `attach_credential`. The registrar owns that failure contract.

use crate::account::{Account, AccountError, CredentialBundle};
use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account with no gateway credentials yet.
    ///
    /// Fails with `AccountError::Conflict` if the email is already taken.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<Uuid, AccountError>;

    /// Attach the gateway credential bundle to an existing account.
    async fn attach_credential(
        &self,
        id: Uuid,
        bundle: &CredentialBundle,
    ) -> Result<(), AccountError>;

    /// Load an account by its email address (case-sensitive, as stored).
    async fn find_by_email(&self, email: &str) -> Result<Account, AccountError>;
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// `PostgreSQL`-backed [`AccountStore`].
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    #[instrument(skip(self, password_hash))]
    async fn insert(&self, email: &str, password_hash: &str) -> Result<Uuid, AccountError> {
        let row = sqlx::query("INSERT INTO accounts (email, password_hash) VALUES ($1, $2) RETURNING id")
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AccountError::Conflict
                } else {
                    AccountError::Store(err.to_string())
                }
            })?;

        row.try_get("id")
            .map_err(|err| AccountError::Store(err.to_string()))
    }

    #[instrument(skip(self, bundle))]
    async fn attach_credential(
        &self,
        id: Uuid,
        bundle: &CredentialBundle,
    ) -> Result<(), AccountError> {
        let result = sqlx::query("UPDATE accounts SET gateway_credentials = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(bundle))
            .execute(&self.pool)
            .await
            .map_err(|err| AccountError::Store(err.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Account, AccountError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, gateway_credentials FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => AccountError::NotFound,
            other => AccountError::Store(other.to_string()),
        })?;

        let credential: Option<Json<CredentialBundle>> = row
            .try_get("gateway_credentials")
            .map_err(|err| AccountError::Store(err.to_string()))?;

        Ok(Account {
            id: row
                .try_get("id")
                .map_err(|err| AccountError::Store(err.to_string()))?,
            email: row
                .try_get("email")
                .map_err(|err| AccountError::Store(err.to_string()))?,
            password_hash: row
                .try_get("password_hash")
                .map_err(|err| AccountError::Store(err.to_string()))?,
            credential: credential.map(|Json(bundle)| bundle),
        })
    }
}
