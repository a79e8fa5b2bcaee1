//! Application settings loaded from environment variables.

use std::env;

use super::constants::{DEFAULT_DATABASE_URL, DEFAULT_MAX_CONNECTIONS};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_current_env()
    }

    /// Load configuration, preferring an explicit env file when one is given.
    pub fn load(path: Option<&str>) -> Self {
        match path {
            Some(path) => {
                if let Err(e) = dotenvy::from_path(path) {
                    tracing::warn!(path, error = %e, "Could not read config file, using environment");
                }
                Self::from_current_env()
            }
            None => Self::from_env(),
        }
    }

    fn from_current_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        }
    }
}
