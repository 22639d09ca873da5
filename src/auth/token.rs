//! Identity tokens
//!
//! HMAC-signed JWTs binding an account number. Tokens are stateless: a
//! token is valid while its signature checks out and `exp` is in the future.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AuthError;
use crate::account::Account;
use crate::config::AuthConfig;

/// Claims carried by an identity token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountClaims {
    /// Account number the bearer controls
    pub account_number: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Issues and validates identity tokens
#[derive(Clone)]
pub struct TokenService {
    secret: Option<String>,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("configured", &self.is_configured())
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenService {
    /// Create a token service from auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            ttl_secs: config.token_ttl_secs,
        }
    }

    /// Check if a signing secret is configured
    pub fn is_configured(&self) -> bool {
        self.secret.as_ref().map(|s| !s.is_empty()).unwrap_or(false)
    }

    fn secret(&self) -> Result<&[u8], AuthError> {
        match self.secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(secret.as_bytes()),
            _ => Err(AuthError::MissingSecret),
        }
    }

    /// Sign a token for the account, expiring `ttl` seconds from now
    pub fn issue_token(&self, account: &Account) -> Result<String, AuthError> {
        let secret = self.secret()?;
        let now = Utc::now().timestamp();
        let claims = AccountClaims {
            account_number: account.number,
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature, algorithm family and expiry, and return the claims
    pub fn validate_token(&self, token: &str) -> Result<AccountClaims, AuthError> {
        let secret = self.secret()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<AccountClaims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "Token validation failed");
                AuthError::InvalidToken
            })
    }
}
