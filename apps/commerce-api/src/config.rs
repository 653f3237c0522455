//! Application configuration loaded from environment variables.
//!
//! Fail-fast: required variables must be present and valid or startup stops
//! with a clear message. An empty `STRIPE_SECRET_KEY` selects the disabled
//! provider stub; an unset `NATS_URL` runs the bus transient-only.

use std::env;
use thiserror::Error;

/// Configuration errors during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("Failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,

    /// Stripe API secret key. Empty selects the disabled stub client.
    pub stripe_secret_key: String,

    /// Stripe webhook endpoint secret for signature verification.
    pub stripe_webhook_secret: String,

    /// NATS server URL for the durable event stream; None = transient-only.
    pub nats_url: Option<String>,

    /// Server bind address.
    pub host: String,

    /// Server listen port.
    pub port: u16,

    /// Separate metrics listener address; None serves /metrics on the main
    /// router.
    pub metrics_addr: Option<String>,

    /// Tracing filter directive.
    pub rust_log: String,

    /// Allowed CORS origins ("*" for development).
    pub cors_origins: Vec<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[redacted]")
            .field("stripe_secret_key", &"[redacted]")
            .field("stripe_webhook_secret", &"[redacted]")
            .field("nats_url", &self.nats_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("metrics_addr", &self.metrics_addr)
            .field("cors_origins", &self.cors_origins)
            .finish_non_exhaustive()
    }
}

/// Development-only webhook secret, used when none is configured.
pub const DEV_WEBHOOK_SECRET: &str = "whsec_dev_secret";

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env is a development convenience only
        let _ = dotenvy::dotenv();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let stripe_secret_key = env::var("STRIPE_SECRET_KEY").unwrap_or_default();

        let stripe_webhook_secret = match env::var("STRIPE_WEBHOOK_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!(
                    "STRIPE_WEBHOOK_SECRET not set, using the development default"
                );
                DEV_WEBHOOK_SECRET.to_string()
            }
        };

        let nats_url = env::var("NATS_URL").ok().filter(|s| !s.is_empty());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        let metrics_addr = env::var("METRICS_ADDR").ok().filter(|s| !s.is_empty());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        Ok(Config {
            database_url,
            stripe_secret_key,
            stripe_webhook_secret,
            nats_url,
            host,
            port,
            metrics_addr,
            rust_log,
            cors_origins,
        })
    }

    /// True when running against live Stripe.
    #[must_use]
    pub fn stripe_live(&self) -> bool {
        !self.stripe_secret_key.is_empty()
    }

    /// Server bind address as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingVar("DATABASE_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing required environment variable: DATABASE_URL"
        );
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = Config {
            database_url: "postgres://localhost/test".to_string(),
            stripe_secret_key: String::new(),
            stripe_webhook_secret: DEV_WEBHOOK_SECRET.to_string(),
            nats_url: None,
            host: "127.0.0.1".to_string(),
            port: 3000,
            metrics_addr: None,
            rust_log: "info".to_string(),
            cors_origins: vec!["*".to_string()],
        };
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert!(!config.stripe_live());
    }
}
