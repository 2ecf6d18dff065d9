//! # Server Configuration
//!
//! Environment-driven configuration, read once at startup.
//!
//! ## Environment Variables
//! ```text
//! ┌────────────────────────┬─────────────────────────┬───────────────────┐
//! │ Variable               │ Purpose                 │ Default           │
//! ├────────────────────────┼─────────────────────────┼───────────────────┤
//! │ TILL_ADDR              │ HTTP listen address     │ 127.0.0.1:8080    │
//! │ TILL_DB_PATH           │ SQLite database file    │ till.db           │
//! │ TILL_MAX_CONNECTIONS   │ Connection pool size    │ 5                 │
//! │ RUST_LOG               │ Tracing filter          │ info (see main)   │
//! └────────────────────────┴─────────────────────────┴───────────────────┘
//! ```
//!
//! A variable that is set but unparseable fails startup with a
//! [`ConfigError`] naming the variable, rather than silently falling back
//! to a default.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Till server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub addr: SocketAddr,

    /// Path to the SQLite database file (created on first run)
    pub database_path: PathBuf,

    /// Maximum connections in the database pool
    pub max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            addr: env::var("TILL_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TILL_ADDR".to_string()))?,

            database_path: env::var("TILL_DB_PATH")
                .unwrap_or_else(|_| "till.db".to_string())
                .into(),

            max_connections: env::var("TILL_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TILL_MAX_CONNECTIONS".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}
