pub mod health;
pub use self::health::health;

pub mod register;
pub use self::register::register;

pub mod login;
pub use self::login::login;

// common request/response shapes for the account handlers
use crate::account::AccountError;
use axum::{http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use uuid::Uuid;

/// Request envelope: `{"data":{"email_address":…,"password":…}}`.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct AccountRequest {
    pub data: AccountCredentials,
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct AccountCredentials {
    pub email_address: String,
    pub password: String,
}

pub(crate) fn credentials_response(account_id: Uuid, token: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "data": {
                "account_id": account_id.to_string(),
                "credentials": { "jwt": token }
            }
        })),
    )
}

// Error bodies carry an array even for a single error.
pub(crate) fn error_response(error: &AccountError) -> (StatusCode, Json<Value>) {
    let status = match error {
        AccountError::Validation(_) | AccountError::Conflict => StatusCode::BAD_REQUEST,
        AccountError::NotFound => StatusCode::NOT_FOUND,
        AccountError::Gateway(_)
        | AccountError::Unprovisioned(_)
        | AccountError::Signing(_)
        | AccountError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({ "data": [error.to_string()] })))
}

pub(crate) fn missing_payload() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "data": ["missing request payload"] })),
    )
}
