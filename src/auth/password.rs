//! Password hashing
//!
//! Argon2id hashing and verification. Verification compares digests in
//! constant time.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
use tracing::debug;

use super::AuthError;
use crate::config::PasswordConfig;

/// Password hashing service
pub struct PasswordService {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordService").finish_non_exhaustive()
    }
}

impl PasswordService {
    /// Build a hasher with the given cost parameters
    pub fn new(config: &PasswordConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::Hashing(format!("Invalid Argon2 params: {}", e)))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        // Verified against when the account does not exist, so unknown
        // numbers cost the same as wrong passwords.
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"placeholder-credential", &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string();

        Ok(Self { argon2, dummy_hash })
    }

    /// Hash a password into a PHC string
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(format!("Failed to hash password: {}", e)))?;

        debug!("Password hashed successfully");
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AuthError::Hashing(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hashing(format!(
                "Password verification error: {}",
                e
            ))),
        }
    }

    /// Burn one verification's worth of work; always false
    pub fn verify_dummy(&self, password: &str) -> bool {
        let _ = self.verify_password(password, &self.dummy_hash);
        false
    }

    /// Hash on the blocking pool
    pub async fn hash_password_blocking(
        self: &Arc<Self>,
        password: String,
    ) -> Result<String, AuthError> {
        let this = Arc::clone(self);
        tokio::task::spawn_blocking(move || this.hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    /// Verify on the blocking pool; `None` hash runs the dummy check
    pub async fn verify_password_blocking(
        self: &Arc<Self>,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, AuthError> {
        let this = Arc::clone(self);
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => this.verify_password(&password, &hash),
            None => Ok(this.verify_dummy(&password)),
        })
        .await
        .map_err(|e| AuthError::Hashing(e.to_string()))?
    }
}
