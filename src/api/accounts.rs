//! Account management API handlers
//!
//! Contains HTTP request handlers for account lifecycle operations.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{parse_id, ApiJson};
use crate::account::{AccountResponse, NewAccount};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::StoreError;

/// Attempts at drawing an unused account number before giving up
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Create account request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    /// Holder's first name
    pub first_name: String,
    /// Holder's last name
    pub last_name: String,
    /// Plaintext password, hashed before storage
    pub password: String,
}

impl CreateAccountRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.first_name.trim().is_empty() {
            return Err(AppError::Validation("firstName cannot be empty".to_string()));
        }
        if self.last_name.trim().is_empty() {
            return Err(AppError::Validation("lastName cannot be empty".to_string()));
        }
        if self.password.is_empty() {
            return Err(AppError::Validation("password cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

/// GET /account - List all accounts
pub async fn list_accounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = state.store.get_accounts().await?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// GET /account/:id - Get a specific account (behind `require_account_owner`)
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let id = parse_id(&id)?;
    let account = state.store.get_account_by_id(id).await?;
    Ok(Json(AccountResponse::from(account)))
}

/// POST /account - Open a new account
pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAccountRequest>,
) -> Result<Json<AccountResponse>, AppError> {
    request.validate()?;

    let encrypted_password = state
        .passwords
        .hash_password_blocking(request.password)
        .await?;
    let mut new_account = NewAccount::new(
        request.first_name.trim().to_string(),
        request.last_name.trim().to_string(),
        encrypted_password,
    );

    let mut attempt = 1;
    let account = loop {
        match state.store.create_account(new_account.clone()).await {
            Ok(account) => break account,
            Err(StoreError::Conflict(reason)) if attempt < MAX_NUMBER_ATTEMPTS => {
                warn!(attempt, reason = %reason, "Account number taken, drawing another");
                new_account.regenerate_number();
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    };

    info!(account_id = account.id, "Account created");
    Ok(Json(AccountResponse::from(account)))
}

/// DELETE /delete-account/:id - Permanently remove an account
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;

    // Existence comes from the affected-row count, not a prior read.
    match state.store.delete_account(id).await {
        Ok(()) => {}
        Err(StoreError::NotFound(_)) => {
            return Err(AppError::NotFound("account not found".to_string()));
        }
        Err(e) => return Err(AppError::Internal(anyhow::Error::new(e))),
    }

    info!(account_id = id, "Account deleted");
    Ok(Json(MessageResponse {
        message: format!("id ({}) has been deleted", id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, PasswordConfig};
    use crate::store::MemoryAccountStore;
    use std::sync::Arc;

    fn create_test_state() -> AppState {
        AppState::new(
            Arc::new(MemoryAccountStore::new()),
            &AuthConfig::with_secret("test-secret"),
            &PasswordConfig::testing(),
        )
        .unwrap()
    }

    fn request(first: &str, last: &str, password: &str) -> CreateAccountRequest {
        CreateAccountRequest {
            first_name: first.to_string(),
            last_name: last.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_accounts_empty() {
        let state = create_test_state();
        let response = list_accounts(State(state)).await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_create_account() {
        let state = create_test_state();
        let Json(created) = create_account(State(state.clone()), ApiJson(request("Ann", "Lee", "pw")))
            .await
            .unwrap();

        assert_eq!(created.first_name, "Ann");
        assert_eq!(created.last_name, "Lee");
        assert_eq!(created.balance, 0);

        let stored = state.store.get_account_by_id(created.id).await.unwrap();
        assert_ne!(stored.encrypted_password, "pw");
        assert!(state
            .passwords
            .verify_password("pw", &stored.encrypted_password)
            .unwrap());

        let list = list_accounts(State(state)).await.unwrap();
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_create_account_rejects_blank_fields() {
        let state = create_test_state();
        for bad in [request(" ", "Lee", "pw"), request("Ann", "", "pw"), request("Ann", "Lee", "")] {
            match create_account(State(state.clone()), ApiJson(bad)).await {
                Err(AppError::Validation(_)) => {}
                other => panic!("Expected Validation error, got: {:?}", other),
            }
        }
        assert!(state.store.get_accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_account_invalid_id() {
        let state = create_test_state();
        let result = get_account(State(state), Path("abc".to_string())).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_account_twice() {
        let state = create_test_state();
        let Json(created) = create_account(State(state.clone()), ApiJson(request("Ann", "Lee", "pw")))
            .await
            .unwrap();

        let Json(message) = delete_account(State(state.clone()), Path(created.id.to_string()))
            .await
            .unwrap();
        assert_eq!(message.message, format!("id ({}) has been deleted", created.id));

        match delete_account(State(state), Path(created.id.to_string())).await {
            Err(AppError::NotFound(_)) => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }
}
