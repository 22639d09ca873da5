//! Account data models
//!
//! Defines the stored account record and its caller-facing representation.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use sqlx::FromRow;
use std::ops::Range;

/// Range account numbers are drawn from
pub const ACCOUNT_NUMBER_RANGE: Range<i64> = 100_000_000..1_000_000_000;

/// A stored bank account
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Account {
    /// Storage primary key, assigned on creation
    pub id: i64,
    /// Holder's first name
    pub first_name: String,
    /// Holder's last name
    pub last_name: String,
    /// Account number bound into identity tokens
    pub number: i64,
    /// Argon2 PHC string; never leaves the service
    pub encrypted_password: String,
    /// Balance in the smallest currency unit
    pub balance: i64,
    /// When the account was opened
    pub created_at: DateTime<Utc>,
}

/// An account that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Holder's first name
    pub first_name: String,
    /// Holder's last name
    pub last_name: String,
    /// Account number
    pub number: i64,
    /// Argon2 PHC string
    pub encrypted_password: String,
    /// Opening balance
    pub balance: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Create a new zero-balance account with a freshly drawn number
    pub fn new(first_name: String, last_name: String, encrypted_password: String) -> Self {
        Self {
            first_name,
            last_name,
            number: Self::generate_number(),
            encrypted_password,
            balance: 0,
            created_at: Utc::now(),
        }
    }

    /// Draw a pseudo-random account number
    ///
    /// Uniqueness is enforced by the store, not here.
    pub fn generate_number() -> i64 {
        rand::thread_rng().gen_range(ACCOUNT_NUMBER_RANGE)
    }

    /// Replace the account number with a fresh draw
    pub fn regenerate_number(&mut self) {
        self.number = Self::generate_number();
    }

    /// Attach the store-assigned id
    pub fn into_account(self, id: i64) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            number: self.number,
            encrypted_password: self.encrypted_password,
            balance: self.balance,
            created_at: self.created_at,
        }
    }
}

/// Account as returned to callers (no credential material)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    /// Storage id
    pub id: i64,
    /// Holder's first name
    pub first_name: String,
    /// Holder's last name
    pub last_name: String,
    /// Account number
    pub number: i64,
    /// Current balance
    pub balance: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        account.clone().into()
    }
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            number: account.number,
            balance: account.balance,
            created_at: account.created_at,
        }
    }
}
