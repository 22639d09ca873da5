//! Account module
//!
//! Account records, the values used to create them, and their public JSON form.

pub mod models;

pub use models::{Account, AccountResponse, NewAccount, ACCOUNT_NUMBER_RANGE};
