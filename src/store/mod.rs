//! Account storage
//!
//! The `AccountStore` trait is the only way the rest of the service touches
//! account records. `SqliteAccountStore` backs the running server;
//! `MemoryAccountStore` backs unit tests.

pub mod memory;
pub mod sqlite;

use crate::account::{Account, NewAccount};
use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryAccountStore;
pub use sqlite::SqliteAccountStore;

/// Errors returned by an `AccountStore`
#[derive(Error, Debug)]
pub enum StoreError {
    /// No row matched the lookup, or a mutation affected zero rows
    #[error("{0}")]
    NotFound(String),

    /// A uniqueness constraint was violated
    #[error("Constraint violation: {0}")]
    Conflict(String),

    /// Transfer source balance is below the requested amount
    #[error("Insufficient funds")]
    InsufficientFunds,

    /// Connectivity or query failure in the backing database
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Balances of both accounts after a completed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Source account balance after the debit
    pub from_balance: i64,
    /// Destination account balance after the credit
    pub to_balance: i64,
}

/// Persistence capability for account records
///
/// Every call goes straight to the backing store; results are visible to
/// the next call with no caching in between.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account and return it with its assigned id
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// All accounts, in storage order
    async fn get_accounts(&self) -> Result<Vec<Account>, StoreError>;

    /// Look up an account by storage id
    async fn get_account_by_id(&self, id: i64) -> Result<Account, StoreError>;

    /// Look up an account by account number
    async fn get_account_by_number(&self, number: i64) -> Result<Account, StoreError>;

    /// Hard-delete an account; `NotFound` when zero rows were removed
    async fn delete_account(&self, id: i64) -> Result<(), StoreError>;

    /// Move `amount` from one account to another as a single atomic unit
    ///
    /// Fails with `NotFound` if either account is missing and with
    /// `InsufficientFunds` if the source cannot cover the amount. On failure
    /// neither balance changes.
    async fn transfer(
        &self,
        from_number: i64,
        to_number: i64,
        amount: i64,
    ) -> Result<TransferOutcome, StoreError>;
}
