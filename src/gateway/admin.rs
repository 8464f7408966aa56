//! HTTP implementation of [`IdentityGateway`] against the gateway admin API.

use crate::account::CredentialBundle;
use crate::gateway::{GatewayError, IdentityGateway};
use crate::konto::APP_USER_AGENT;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::time::{Duration, SystemTime};
use tracing::{debug, instrument};
use url::Url;

const ADMIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the gateway admin API (consumer and credential provisioning).
#[derive(Debug, Clone)]
pub struct AdminGateway {
    base_url: String,
    client: Client,
}

impl AdminGateway {
    /// Build a client for the admin API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)?;

        let scheme = url.scheme();

        let host = url
            .host()
            .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
            .to_owned();

        let port = match url.port() {
            Some(p) => p,
            None => match scheme {
                "http" => 80,
                "https" => 443,
                _ => return Err(anyhow!("Error parsing URL: unsupported scheme {}", scheme)),
            },
        };

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(ADMIN_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: format!("{scheme}://{host}:{port}"),
            client,
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        debug!("endpoint: {}", endpoint);

        format!("{}{endpoint}", self.base_url)
    }
}

async fn error_from_response(url: &str, response: Response) -> GatewayError {
    let status = response.status().as_u16();

    let message = match response.json::<Value>().await {
        Ok(body) => body["message"]
            .as_str()
            .map_or_else(|| body.to_string(), ToString::to_string),
        Err(_) => String::new(),
    };

    GatewayError::Status {
        status,
        message: format!("{url} - {message}"),
    }
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[async_trait]
impl IdentityGateway for AdminGateway {
    #[instrument(skip(self))]
    async fn create_consumer(&self, account_ref: &str) -> Result<String, GatewayError> {
        let url = self.endpoint_url("/consumers");

        let response = self
            .client
            .post(&url)
            .json(&json!({ "custom_id": account_ref }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(&url, response).await);
        }

        let body: Value = response.json().await?;

        body["id"].as_str().map_or_else(
            || {
                Err(GatewayError::Malformed(
                    "no consumer id in response".to_string(),
                ))
            },
            |id| Ok(id.to_string()),
        )
    }

    #[instrument(skip(self))]
    async fn issue_credentials(
        &self,
        consumer_id: &str,
    ) -> Result<CredentialBundle, GatewayError> {
        let url = self.endpoint_url(&format!("/consumers/{consumer_id}/jwt"));

        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(error_from_response(&url, response).await);
        }

        let body: Value = response.json().await?;

        let key = body["key"]
            .as_str()
            .ok_or_else(|| GatewayError::Malformed("no key in response".to_string()))?;

        let secret = body["secret"]
            .as_str()
            .ok_or_else(|| GatewayError::Malformed("no secret in response".to_string()))?;

        Ok(CredentialBundle {
            consumer_id: consumer_id.to_string(),
            key: key.to_string(),
            secret: secret.to_string(),
            issued_at: body["created_at"].as_i64().unwrap_or_else(now_unix_seconds),
        })
    }
}
