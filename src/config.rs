//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults. Read once at startup and injected into services.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Token signing configuration
    pub auth: AuthConfig,
    /// Password hashing cost
    pub password: PasswordConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection string (e.g. `sqlite:bank.db`)
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
}

/// Token signing configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC signing secret; `None` disables token issuance and validation
    pub jwt_secret: Option<String>,
    /// Lifetime of an issued token, in seconds
    pub token_ttl_secs: i64,
}

// Keep the secret out of `Config` debug logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl AuthConfig {
    /// Default token lifetime (15 minutes)
    pub const DEFAULT_TOKEN_TTL_SECS: i64 = 900;

    /// Create an auth config with the given secret and the default lifetime
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
            token_ttl_secs: Self::DEFAULT_TOKEN_TTL_SECS,
        }
    }

    /// Whether a usable signing secret is configured
    pub fn is_configured(&self) -> bool {
        self.jwt_secret
            .as_ref()
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of iterations
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    /// Low cost parameters for tests (fast, not secure)
    pub fn testing() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let password_defaults = PasswordConfig::default();
        Self {
            server: ServerConfig {
                port: env_parse("PORT").unwrap_or(3000),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:bank.db".to_string()),
                max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(5),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
                token_ttl_secs: env_parse("TOKEN_TTL_SECS")
                    .filter(|ttl: &i64| *ttl > 0)
                    .unwrap_or(AuthConfig::DEFAULT_TOKEN_TTL_SECS),
            },
            password: PasswordConfig {
                memory_kib: env_parse("ARGON2_MEMORY_KIB").unwrap_or(password_defaults.memory_kib),
                iterations: env_parse("ARGON2_ITERATIONS").unwrap_or(password_defaults.iterations),
                parallelism: env_parse("ARGON2_PARALLELISM")
                    .unwrap_or(password_defaults.parallelism),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "PORT",
            "HOST",
            "DATABASE_URL",
            "DB_MAX_CONNECTIONS",
            "JWT_SECRET",
            "TOKEN_TTL_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env();
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.database.url, "sqlite:bank.db");
        assert_eq!(config.database.max_connections, 5);
        assert!(!config.auth.is_configured());
        assert_eq!(config.auth.token_ttl_secs, AuthConfig::DEFAULT_TOKEN_TTL_SECS);
    }

    #[test]
    #[serial]
    fn test_overrides_from_env() {
        clear_env();
        env::set_var("PORT", "8081");
        env::set_var("HOST", "127.0.0.1");
        env::set_var("JWT_SECRET", "s3cret");
        env::set_var("TOKEN_TTL_SECS", "60");

        let config = Config::from_env();
        assert_eq!(config.server_addr(), "127.0.0.1:8081");
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.auth.token_ttl_secs, 60);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_secret_is_unconfigured() {
        clear_env();
        env::set_var("JWT_SECRET", "");
        let config = Config::from_env();
        assert!(config.auth.jwt_secret.is_none());
        clear_env();
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = AuthConfig::with_secret("hunter2");
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("redacted"));
    }
}
