//! Authentication and authorization
//!
//! Password hashing, signed identity tokens, credential checks, and the
//! middleware that scopes a token to the one account it was issued for.

pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;

use crate::store::StoreError;
use thiserror::Error;

pub use identity::{IdentityService, LoginOutcome};
pub use middleware::{require_account_owner, AuthenticatedAccount, TOKEN_HEADER};
pub use password::PasswordService;
pub use token::{AccountClaims, TokenService};

/// Errors raised while verifying credentials or tokens
#[derive(Error, Debug)]
pub enum AuthError {
    /// No signing secret is configured
    #[error("Token signing secret is not configured")]
    MissingSecret,

    /// Token is malformed, wrongly signed, uses the wrong algorithm or has expired
    #[error("Invalid token")]
    InvalidToken,

    /// Unknown account number or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account lookup failed for a reason other than absence
    #[error("Account lookup failed: {0}")]
    Store(StoreError),

    /// Password hashing or verification could not run
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    /// Token could not be signed
    #[error("Token signing failed: {0}")]
    Signing(String),
}
