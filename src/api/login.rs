//! Login API handler
//!
//! Exchanges an account number and password for an identity token.

use axum::{extract::State, response::Json};
use serde::Deserialize;

use super::ApiJson;
use crate::auth::{AuthError, LoginOutcome};
use crate::error::AppError;
use crate::state::AppState;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account number
    pub number: i64,
    /// Plaintext password
    pub password: String,
}

/// POST /login - Issue a token for valid credentials
///
/// Unknown numbers and bad passwords produce the same response.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginOutcome>, AppError> {
    let outcome = state
        .identity
        .login(request.number, &request.password)
        .await
        .map_err(|e| match e {
            // No secret means the server cannot sign, not that the caller is wrong.
            AuthError::MissingSecret => {
                AppError::Internal(anyhow::anyhow!("token signing secret is not configured"))
            }
            other => AppError::from(other),
        })?;

    Ok(Json(outcome))
}
