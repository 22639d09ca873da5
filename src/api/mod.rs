//! API module
//!
//! HTTP request handlers and the router that wires them together.

pub mod accounts;
pub mod login;
pub mod transfer;

use axum::{
    extract::FromRequest,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;

use crate::auth::require_account_owner;
use crate::error::AppError;
use crate::state::AppState;

/// JSON body extractor whose rejections become `AppError::Validation`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "healthy" when the process can answer
    pub status: String,
    /// Crate version
    pub version: String,
}

/// GET /health - Liveness probe
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the application router
///
/// Layers that are not route specific (tracing, CORS, request ids) are
/// added by the binary.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/account/:id", get(accounts::get_account))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_account_owner,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login::login))
        .route(
            "/account",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/delete-account/:id", delete(accounts::delete_account))
        .route("/transfer", post(transfer::transfer))
        .merge(protected)
        .with_state(state)
}

/// Parse a route id, rejecting anything that is not an integer
pub(crate) fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("invalid given id {}", raw)))
}
