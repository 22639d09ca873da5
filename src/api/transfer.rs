//! Transfer API handler
//!
//! Moves money from the caller's account (taken from the token) to another
//! account. Debit and credit commit together or not at all.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ApiJson;
use crate::auth::AuthenticatedAccount;
use crate::error::AppError;
use crate::state::AppState;

/// Transfer request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Destination account number
    pub to_account: i64,
    /// Amount in the smallest currency unit
    pub amount: i64,
}

/// Completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    /// Source account number
    pub from_account: i64,
    /// Destination account number
    pub to_account: i64,
    /// Amount moved
    pub amount: i64,
    /// Source balance after the transfer
    pub balance: i64,
}

/// POST /transfer - Move funds out of the caller's account
pub async fn transfer(
    State(state): State<AppState>,
    AuthenticatedAccount(claims): AuthenticatedAccount,
    ApiJson(request): ApiJson<TransferRequest>,
) -> Result<Json<TransferResponse>, AppError> {
    let from_account = claims.account_number;

    if request.amount <= 0 {
        return Err(AppError::Validation(
            "amount must be greater than zero".to_string(),
        ));
    }
    if request.to_account == from_account {
        return Err(AppError::Validation(
            "cannot transfer to the same account".to_string(),
        ));
    }

    let outcome = state
        .store
        .transfer(from_account, request.to_account, request.amount)
        .await
        .map_err(|e| {
            warn!(
                from_account,
                to_account = request.to_account,
                amount = request.amount,
                error = %e,
                "Transfer rejected"
            );
            AppError::from(e)
        })?;

    info!(
        from_account,
        to_account = request.to_account,
        amount = request.amount,
        "Transfer completed"
    );

    Ok(Json(TransferResponse {
        from_account,
        to_account: request.to_account,
        amount: request.amount,
        balance: outcome.from_balance,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::NewAccount;
    use crate::auth::AccountClaims;
    use crate::config::{AuthConfig, PasswordConfig};
    use crate::store::MemoryAccountStore;
    use std::sync::Arc;

    async fn setup() -> AppState {
        let state = AppState::new(
            Arc::new(MemoryAccountStore::new()),
            &AuthConfig::with_secret("s"),
            &PasswordConfig::testing(),
        )
        .unwrap();
        for (number, balance) in [(1, 100), (2, 0)] {
            let mut account = NewAccount::new("A".into(), "B".into(), "hash".into());
            account.number = number;
            account.balance = balance;
            state.store.create_account(account).await.unwrap();
        }
        state
    }

    fn caller(number: i64) -> AuthenticatedAccount {
        AuthenticatedAccount(AccountClaims {
            account_number: number,
            iat: 0,
            exp: i64::MAX,
        })
    }

    fn body(to_account: i64, amount: i64) -> ApiJson<TransferRequest> {
        ApiJson(TransferRequest { to_account, amount })
    }

    #[tokio::test]
    async fn test_transfer_success() {
        let state = setup().await;
        let Json(response) = transfer(State(state.clone()), caller(1), body(2, 30))
            .await
            .unwrap();

        assert_eq!(
            response,
            TransferResponse {
                from_account: 1,
                to_account: 2,
                amount: 30,
                balance: 70
            }
        );
        assert_eq!(state.store.get_account_by_number(2).await.unwrap().balance, 30);
    }

    #[tokio::test]
    async fn test_transfer_rejects_bad_amounts() {
        let state = setup().await;
        for amount in [0, -5] {
            let result = transfer(State(state.clone()), caller(1), body(2, amount)).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        let result = transfer(State(state.clone()), caller(1), body(1, 10)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds() {
        let state = setup().await;
        let result = transfer(State(state.clone()), caller(2), body(1, 1)).await;
        assert!(matches!(result, Err(AppError::InsufficientFunds)));
        assert_eq!(state.store.get_account_by_number(1).await.unwrap().balance, 100);
    }

    #[tokio::test]
    async fn test_transfer_unknown_destination() {
        let state = setup().await;
        let result = transfer(State(state.clone()), caller(1), body(99, 10)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(state.store.get_account_by_number(1).await.unwrap().balance, 100);
    }
}
