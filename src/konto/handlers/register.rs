use crate::account::registrar::Registrar;
use crate::konto::handlers::{
    credentials_response, error_response, missing_payload, AccountRequest,
};
use axum::{extract::Extension, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{error, instrument};

#[utoipa::path(
    post,
    path= "/accounts/register",
    request_body = AccountRequest,
    responses (
        (status = 200, description = "Account created, token issued", content_type = "application/json"),
        (status = 400, description = "Invalid input or email already registered"),
        (status = 500, description = "Gateway or storage failure"),
    ),
    tag= "accounts"
)]
// axum handler for account registration
#[instrument(skip_all)]
pub async fn register(
    registrar: Extension<Arc<Registrar>>,
    payload: Option<Json<AccountRequest>>,
) -> impl IntoResponse {
    let Some(Json(request)) = payload else {
        return missing_payload();
    };

    // Run the saga on its own task so a client that goes away mid-request
    // does not cancel provisioning that already started.
    let registrar = registrar.0.clone();
    let result = tokio::spawn(async move {
        registrar
            .register(&request.data.email_address, &request.data.password)
            .await
    })
    .await;

    match result {
        Ok(Ok(issued)) => credentials_response(issued.account_id, &issued.token),
        Ok(Err(err)) => {
            error!("Registration failed: {}", err);
            error_response(&err)
        }
        Err(err) => {
            error!("Registration task failed: {}", err);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "data": ["registration failed"] })),
            )
        }
    }
}
