//! HTTP surface: router, middleware and server lifecycle.

use crate::account::{authenticator::Authenticator, registrar::Registrar, store::PgAccountStore};
use crate::gateway::{admin::AdminGateway, IdentityGateway};
use crate::konto::handlers::{
    health, health::__path_health, login, login::__path_login, register, register::__path_register,
};
use anyhow::{Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::OpenApi;

pub(crate) mod handlers;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[derive(OpenApi)]
#[openapi(
    paths(health, register, login),
    components(schemas(handlers::AccountRequest, handlers::AccountCredentials)),
    tags(
        (name = "konto", description = "Account provisioning and authentication API")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: &str, gateway_url: &str) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgAccountStore::new(pool));
    let gateway: Arc<dyn IdentityGateway> = Arc::new(AdminGateway::new(gateway_url)?);

    let registrar = Arc::new(Registrar::new(store.clone(), gateway));
    let authenticator = Arc::new(Authenticator::new(store));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app(registrar, authenticator).into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

/// Assemble the router around explicit dependency handles.
fn app(registrar: Arc<Registrar>, authenticator: Arc<Authenticator>) -> Router {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/accounts/register", post(handlers::register))
        .route("/accounts/login", post(handlers::login))
        .route("/healthcheck", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(registrar))
                .layer(Extension(authenticator)),
        )
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::testing::{FakeGateway, MemoryAccountStore};
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let store = Arc::new(MemoryAccountStore::default());
        let gateway: Arc<dyn IdentityGateway> = Arc::new(FakeGateway::default());
        let registrar = Arc::new(Registrar::new(store.clone(), gateway));
        let authenticator = Arc::new(Authenticator::new(store));
        app(registrar, authenticator)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn credentials(email: &str, password: &str) -> Value {
        json!({ "data": { "email_address": email, "password": password } })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn healthcheck_is_ok() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/healthcheck")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-app"));
        assert_eq!(body_json(response).await, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn register_login_scenario() {
        let app = test_app();

        // register("a@x.com","pw1") -> 200, non-empty account_id and jwt
        let response = app
            .clone()
            .oneshot(post_json("/accounts/register", credentials("a@x.com", "pw1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(!body["data"]["account_id"].as_str().unwrap().is_empty());
        assert!(!body["data"]["credentials"]["jwt"]
            .as_str()
            .unwrap()
            .is_empty());

        // register("a@x.com","pw2") -> 400 conflict
        let response = app
            .clone()
            .oneshot(post_json("/accounts/register", credentials("a@x.com", "pw2")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "data": ["account already exists"] })
        );

        // login("a@x.com","pw1") -> 200 with a fresh token
        let response = app
            .clone()
            .oneshot(post_json("/accounts/login", credentials("a@x.com", "pw1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(!body["data"]["credentials"]["jwt"]
            .as_str()
            .unwrap()
            .is_empty());

        // login with wrong password and unknown email: identical 404 bodies
        let response = app
            .clone()
            .oneshot(post_json("/accounts/login", credentials("a@x.com", "wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let wrong_password = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        let response = app
            .clone()
            .oneshot(post_json(
                "/accounts/login",
                credentials("nobody@x.com", "pw1"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let unknown_email = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        assert_eq!(wrong_password, unknown_email);
        assert_eq!(
            serde_json::from_slice::<Value>(&wrong_password).unwrap(),
            json!({ "data": ["user not found"] })
        );
    }

    #[tokio::test]
    async fn register_validates_input() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/accounts/register",
                credentials("not-an-email", "pw1"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "data": ["invalid email address"] })
        );

        let response = app
            .oneshot(post_json("/accounts/register", credentials("a@x.com", "")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_payload_is_a_400() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/accounts/register")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "data": ["missing request payload"] })
        );
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_as_500() {
        let store = Arc::new(MemoryAccountStore::default());
        let gateway: Arc<dyn IdentityGateway> = Arc::new(FakeGateway::failing_create());
        let registrar = Arc::new(Registrar::new(store.clone(), gateway));
        let authenticator = Arc::new(Authenticator::new(store));
        let app = app(registrar, authenticator);

        let response = app
            .clone()
            .oneshot(post_json("/accounts/register", credentials("a@x.com", "pw1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // The orphaned row makes login a 500, never a 404.
        let response = app
            .oneshot(post_json("/accounts/login", credentials("a@x.com", "pw1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
