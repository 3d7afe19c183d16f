//!
//! # Application Configuration
//!
//! Environment-driven configuration, loaded once at startup. The signing
//! configuration is deliberately an immutable value (`AuthConfig`) that gets
//! injected into the token service at construction. Nothing re-reads the
//! environment after startup, so the signing setup cannot change mid-process.
//!
//! Loading fails (and the process must refuse to start) when the database URL
//! is missing, when the signing secret is empty, or when the configured
//! algorithm is unknown.

use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::env;
use std::fmt;
use std::str::FromStr;

/// The default lifetime of issued tokens, in minutes.
///
/// This is the single advertised default. It applies whenever no explicit
/// TTL is requested at issuance and `TOKEN_TTL_MINUTES` is not set.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} must be set and non-empty", name),
            ConfigError::Invalid(name, value) => {
                write!(f, "{} has invalid value {:?}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Immutable signing configuration for the token service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign and verify tokens. Never empty.
    pub jwt_secret: String,
    /// Signing algorithm. Only the HMAC family is supported, since the
    /// secret is a shared symmetric key.
    pub jwt_algorithm: Algorithm,
    /// Lifetime applied to tokens issued without an explicit TTL.
    pub token_ttl: Duration,
}

pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let server_port = match env::var("SERVER_PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| ConfigError::Invalid("SERVER_PORT", port))?,
            Err(_) => 8080,
        };
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        Ok(Self {
            database_url,
            server_host,
            server_port,
            auth: AuthConfig::from_env()?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        let jwt_algorithm = match env::var("JWT_ALGORITHM") {
            Ok(name) => {
                let algorithm = Algorithm::from_str(&name)
                    .map_err(|_| ConfigError::Invalid("JWT_ALGORITHM", name.clone()))?;
                // A symmetric secret only works with HMAC.
                match algorithm {
                    Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => algorithm,
                    _ => return Err(ConfigError::Invalid("JWT_ALGORITHM", name)),
                }
            }
            Err(_) => Algorithm::HS256,
        };

        let token_ttl = match env::var("TOKEN_TTL_MINUTES") {
            Ok(minutes) => {
                let minutes: i64 = minutes
                    .parse()
                    .map_err(|_| ConfigError::Invalid("TOKEN_TTL_MINUTES", minutes))?;
                Duration::minutes(minutes)
            }
            Err(_) => Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        };

        Ok(Self {
            jwt_secret,
            jwt_algorithm,
            token_ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        // Env vars are process-global, so tests touching them serialize.
        static ref ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    }

    fn clear_auth_env() {
        env::remove_var("JWT_SECRET");
        env::remove_var("JWT_ALGORITHM");
        env::remove_var("TOKEN_TTL_MINUTES");
    }

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_auth_env();

        env::set_var("DATABASE_URL", "postgres://test");
        env::set_var("JWT_SECRET", "test-secret");
        env::remove_var("SERVER_PORT");
        env::remove_var("SERVER_HOST");

        let config = Config::from_env().unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.auth.jwt_algorithm, Algorithm::HS256);
        assert_eq!(
            config.auth.token_ttl,
            Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES)
        );

        // Custom values
        env::set_var("SERVER_PORT", "3000");
        env::set_var("SERVER_HOST", "0.0.0.0");
        env::set_var("JWT_ALGORITHM", "HS384");
        env::set_var("TOKEN_TTL_MINUTES", "90");

        let config = Config::from_env().unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.auth.jwt_algorithm, Algorithm::HS384);
        assert_eq!(config.auth.token_ttl, Duration::minutes(90));

        env::remove_var("SERVER_PORT");
        env::remove_var("SERVER_HOST");
        clear_auth_env();
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_auth_env();

        env::set_var("JWT_SECRET", "");
        match AuthConfig::from_env() {
            Err(ConfigError::Missing("JWT_SECRET")) => {}
            other => panic!("expected missing JWT_SECRET, got {:?}", other.err()),
        }
        clear_auth_env();
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_auth_env();

        env::set_var("JWT_SECRET", "test-secret");
        env::set_var("JWT_ALGORITHM", "none");
        assert!(AuthConfig::from_env().is_err());

        // Asymmetric algorithms make no sense with a shared secret.
        env::set_var("JWT_ALGORITHM", "RS256");
        assert!(AuthConfig::from_env().is_err());

        clear_auth_env();
    }
}
