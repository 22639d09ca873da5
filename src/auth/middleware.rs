//! API Middleware
//!
//! Token checks for protected routes. Every failure here answers 403 with
//! the same body and never reaches the wrapped handler.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::AccountClaims;
use crate::error::AppError;
use crate::state::AppState;

/// Request header carrying the identity token
pub const TOKEN_HEADER: &str = "x-jwt-token";

fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Why a request was turned away (logged, never returned)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Denial {
    MissingToken,
    InvalidToken,
    InvalidId,
    UnknownAccount,
    NumberMismatch,
}

async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    raw_id: &str,
) -> Result<AccountClaims, Denial> {
    let token = token_from_headers(headers).ok_or(Denial::MissingToken)?;

    let claims = state
        .identity
        .validate_token(token)
        .map_err(|_| Denial::InvalidToken)?;

    let id: i64 = raw_id.parse().map_err(|_| Denial::InvalidId)?;

    let account = state
        .store
        .get_account_by_id(id)
        .await
        .map_err(|_| Denial::UnknownAccount)?;

    if account.number != claims.account_number {
        return Err(Denial::NumberMismatch);
    }

    Ok(claims)
}

/// Only let the request through if its token is bound to the account in `:id`
///
/// On success the verified `AccountClaims` are added to request extensions.
pub async fn require_account_owner(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize(&state, request.headers(), &raw_id).await {
        Ok(claims) => {
            debug!(account_number = claims.account_number, "Token accepted");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(denial) => {
            warn!(reason = ?denial, route_id = %raw_id, "Permission denied");
            AppError::Forbidden.into_response()
        }
    }
}

/// Extractor for handlers that need a valid token but no route-scoped check
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub AccountClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or_else(|| {
            warn!(reason = ?Denial::MissingToken, "Permission denied");
            AppError::Forbidden
        })?;

        let claims = state.identity.validate_token(token).map_err(|e| {
            warn!(reason = ?Denial::InvalidToken, error = %e, "Permission denied");
            AppError::Forbidden
        })?;

        Ok(AuthenticatedAccount(claims))
    }
}
