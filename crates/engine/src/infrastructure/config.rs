//! Application configuration

use std::env;

use anyhow::{bail, Context, Result};

/// Which record store backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown store backend '{other}' (expected sqlite or memory)"),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Interface the HTTP server binds to
    pub server_host: String,
    /// HTTP server port
    pub server_port: u16,

    /// Record store backend: "sqlite" or "memory"
    pub store_backend: StoreBackend,
    /// SQLite database path (if using sqlite backend)
    pub database_path: String,

    /// CORS allowed origins (comma-separated, or "*" for any)
    pub cors_allowed_origins: Vec<String>,

    /// Maximum users returned by the user listing
    pub user_list_limit: usize,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: var("SERVER_PORT")
                .or_else(|| var("PORT"))
                .unwrap_or_else(|| "8001".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            store_backend: var("STORE_BACKEND")
                .unwrap_or_else(|| "sqlite".to_string())
                .parse()
                .context("STORE_BACKEND is invalid")?,
            database_path: var("DATABASE_PATH")
                .unwrap_or_else(|| "./data/questbound.db".to_string()),

            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            user_list_limit: var("USER_LIST_LIMIT")
                .unwrap_or_else(|| "100".to_string())
                .parse()
                .context("USER_LIST_LIMIT must be a positive integer")?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
