//! Process configuration.
//!
//! Loaded once at startup; a missing required value is fatal there, never
//! during request handling.

use std::path::PathBuf;

use thiserror::Error;

use banquet_auth::{AuthConfig, FileSessionStore};

/// Environment variable carrying the token signing secret.
pub const ENV_SIGNING_SECRET: &str = "BANQUET_SECRET";
/// Environment variable carrying the store connection string.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
/// Environment variable carrying the alert collector address (optional).
pub const ENV_ALERT_SINK: &str = "BANQUET_ALERT_SINK";
/// Environment variable overriding the session cache path (optional).
pub const ENV_SESSION_FILE: &str = "BANQUET_SESSION_FILE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Startup configuration for the process.
#[derive(Debug, Clone)]
pub struct Config {
    /// Token signing secret; process-wide, read-only after startup.
    pub signing_secret: String,
    /// Connection string handed to the storage collaborator.
    pub database_url: String,
    /// Alert collector address; `None` leaves audit events on the tracing
    /// sink only.
    pub alert_sink: Option<String>,
    /// Location of the local session cache file.
    pub session_file: PathBuf,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            signing_secret: require(ENV_SIGNING_SECRET)?,
            database_url: require(ENV_DATABASE_URL)?,
            alert_sink: optional(ENV_ALERT_SINK),
            session_file: optional(ENV_SESSION_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(FileSessionStore::default_path),
        })
    }

    /// The authentication slice of this configuration.
    pub fn auth(&self) -> AuthConfig {
        AuthConfig::new(self.signing_secret.clone())
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}
