//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `CATALOG_HOST` - Bind address (default: 127.0.0.1)
//! - `CATALOG_PORT` - Listen port for commands (default: 3001)
//! - `CATALOG_CHANNEL_BUFFER` - Mailbox size of every actor (default: 100)
//! - `CATALOG_LOG_LEVEL` - Log filter used when `RUST_LOG` is unset (default: info)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// IP address to bind the command listener to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    pub channel_buffer: usize,
    pub log_level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3001,
            channel_buffer: 100,
            log_level: "info".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value when set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse_or("CATALOG_HOST", &lookup, defaults.host)?;
        let port = parse_or("CATALOG_PORT", &lookup, defaults.port)?;
        let channel_buffer = parse_or("CATALOG_CHANNEL_BUFFER", &lookup, defaults.channel_buffer)?;
        if channel_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "CATALOG_CHANNEL_BUFFER".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let log_level = lookup("CATALOG_LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            host,
            port,
            channel_buffer,
            log_level,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
