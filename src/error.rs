//! Error types and error handling for the application
//!
//! This module defines the error type handlers return. Every variant maps to
//! an HTTP status and a `{error, status}` JSON body via `IntoResponse`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Application-level error types
///
/// All errors that can surface from a handler are represented by this enum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed request body, route parameter or field value
    #[error("{0}")]
    Validation(String),

    /// Login failed; deliberately does not say why
    #[error("not authenticated")]
    Unauthenticated,

    /// Caller's token does not grant access to the requested resource
    #[error("permission denied")]
    Forbidden,

    /// Entity absent or no rows affected
    #[error("{0}")]
    NotFound(String),

    /// Source account cannot cover a transfer
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Storage backend failure; callers only see a generic message
    #[error("Store error: {0}")]
    Store(StoreError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            StoreError::InsufficientFunds => AppError::InsufficientFunds,
            other => AppError::Store(other),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthenticated,
            AuthError::InvalidToken | AuthError::MissingSecret => AppError::Forbidden,
            AuthError::Store(e) => AppError::from(e),
            AuthError::Hashing(msg) | AuthError::Signing(msg) => {
                AppError::Internal(anyhow::anyhow!(msg))
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientFunds => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Internal and storage details go to the log only.
        let error_message = match &self {
            AppError::Store(_) => {
                tracing::error!(error = %self, "Request failed with store error");
                "store error".to_string()
            }
            _ if status.is_server_error() => {
                tracing::error!(error = %self, "Request failed with internal error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
