//! Shared application state
//!
//! Services handed to every handler through axum's `State`.

pub mod app_state;

pub use app_state::AppState;
