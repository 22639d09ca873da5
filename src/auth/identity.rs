//! Identity service
//!
//! Verifies account credentials and issues tokens for them.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::{AccountClaims, AuthError, PasswordService, TokenService};
use crate::account::Account;
use crate::store::{AccountStore, StoreError};

/// Successful login result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    /// Signed identity token
    pub token: String,
    /// Account number the token is bound to
    pub number: i64,
}

/// Credential verification and token issuance
pub struct IdentityService {
    store: Arc<dyn AccountStore>,
    passwords: Arc<PasswordService>,
    tokens: TokenService,
}

impl IdentityService {
    /// Create an identity service over the given store
    pub fn new(
        store: Arc<dyn AccountStore>,
        passwords: Arc<PasswordService>,
        tokens: TokenService,
    ) -> Self {
        Self {
            store,
            passwords,
            tokens,
        }
    }

    /// Check a number/password pair
    ///
    /// Unknown numbers and wrong passwords both yield `InvalidCredentials`,
    /// and both run one hash verification.
    pub async fn authenticate(&self, number: i64, password: &str) -> Result<Account, AuthError> {
        let account = match self.store.get_account_by_number(number).await {
            Ok(account) => Some(account),
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(AuthError::Store(e)),
        };

        let stored_hash = account.as_ref().map(|a| a.encrypted_password.clone());
        let valid = self
            .passwords
            .verify_password_blocking(password.to_string(), stored_hash)
            .await?;

        match account {
            Some(account) if valid => Ok(account),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Sign a token for the account
    pub fn issue_token(&self, account: &Account) -> Result<String, AuthError> {
        self.tokens.issue_token(account)
    }

    /// Validate a token string and return its claims
    pub fn validate_token(&self, token: &str) -> Result<AccountClaims, AuthError> {
        self.tokens.validate_token(token)
    }

    /// Authenticate and issue a token in one step
    pub async fn login(&self, number: i64, password: &str) -> Result<LoginOutcome, AuthError> {
        let account = match self.authenticate(number, password).await {
            Ok(account) => account,
            Err(e) => {
                warn!(error = %e, "Login rejected");
                return Err(e);
            }
        };

        let token = self.issue_token(&account)?;
        info!(account_id = account.id, "Login succeeded");

        Ok(LoginOutcome {
            token,
            number: account.number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use crate::config::{AuthConfig, PasswordConfig};
    use crate::store::MemoryAccountStore;

    async fn setup() -> (IdentityService, Account) {
        let store: Arc<dyn AccountStore> = Arc::new(MemoryAccountStore::new());
        let passwords = Arc::new(PasswordService::new(&PasswordConfig::testing()).unwrap());

        let hash = passwords.hash_password("pw").unwrap();
        let account = store
            .create_account(NewAccount::new("Ann".into(), "Lee".into(), hash))
            .await
            .unwrap();

        let identity = IdentityService::new(
            store,
            passwords,
            TokenService::new(&AuthConfig::with_secret("test-secret")),
        );
        (identity, account)
    }

    #[tokio::test]
    async fn test_login_success() {
        let (identity, account) = setup().await;
        let outcome = identity.login(account.number, "pw").await.unwrap();

        assert_eq!(outcome.number, account.number);
        let claims = identity.validate_token(&outcome.token).unwrap();
        assert_eq!(claims.account_number, account.number);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_number_look_alike() {
        let (identity, account) = setup().await;

        let wrong_password = identity.authenticate(account.number, "nope").await;
        let unknown_number = identity.authenticate(account.number + 1, "pw").await;

        match (wrong_password, unknown_number) {
            (Err(a), Err(b)) => {
                assert!(matches!(a, AuthError::InvalidCredentials));
                assert!(matches!(b, AuthError::InvalidCredentials));
                assert_eq!(a.to_string(), b.to_string());
            }
            other => panic!("Expected two credential errors, got: {:?}", other),
        }
    }
}
