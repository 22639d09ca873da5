//! Application state
//!
//! Holds the account store and the auth services built from configuration.

use std::sync::Arc;

use crate::auth::{AuthError, IdentityService, PasswordService, TokenService};
use crate::config::{AuthConfig, PasswordConfig};
use crate::store::AccountStore;

/// State shared by all handlers
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Account persistence
    pub store: Arc<dyn AccountStore>,
    /// Login and token validation
    pub identity: Arc<IdentityService>,
    /// Password hashing for new accounts
    pub passwords: Arc<PasswordService>,
}

impl AppState {
    /// Wire the services around a store
    pub fn new(
        store: Arc<dyn AccountStore>,
        auth: &AuthConfig,
        password: &PasswordConfig,
    ) -> Result<Self, AuthError> {
        let passwords = Arc::new(PasswordService::new(password)?);
        let identity = Arc::new(IdentityService::new(
            Arc::clone(&store),
            Arc::clone(&passwords),
            TokenService::new(auth),
        ));

        Ok(Self {
            store,
            identity,
            passwords,
        })
    }
}
