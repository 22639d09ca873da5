//! Bank Service Library
//!
//! Account storage, token-based authorization scoped to a single account,
//! and the HTTP API over both. The server binary is in `src/main.rs`.

pub mod account;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
/// Application state management
///
/// Holds the store and auth services shared by all handlers.
pub mod state;
pub mod store;
