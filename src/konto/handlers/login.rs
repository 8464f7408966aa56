use crate::account::authenticator::Authenticator;
use crate::konto::handlers::{
    credentials_response, error_response, missing_payload, AccountRequest,
};
use axum::{extract::Extension, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{debug, error, instrument};

#[utoipa::path(
    post,
    path= "/accounts/login",
    request_body = AccountRequest,
    responses (
        (status = 200, description = "Login successful, token issued", content_type = "application/json"),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Unknown email or wrong password"),
        (status = 500, description = "Storage or signing failure"),
    ),
    tag= "accounts"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    authenticator: Extension<Arc<Authenticator>>,
    payload: Option<Json<AccountRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    match authenticator
        .login(&request.data.email_address, &request.data.password)
        .await
    {
        Ok(issued) => {
            debug!(account_id = %issued.account_id, "login successful");
            credentials_response(issued.account_id, &issued.token)
        }
        Err(err) => {
            error!("Login failed: {}", err);
            error_response(&err)
        }
    }
}
