//! Process configuration read from the environment (and `.env`, if present).

use std::env;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::constants::{DEFAULT_FETCH_INTERVAL_SECS, DEFAULT_PORT, YOUTUBE_SEARCH_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a port number, got {0:?}")]
    InvalidPort(String),

    #[error("FETCH_INTERVAL_SECS must be a positive number of seconds, got {0:?}")]
    InvalidInterval(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Sent as `key` on every upstream request. Empty when unset, in which
    /// case every ingestion cycle fails upstream and is logged.
    pub youtube_api_key: String,
    pub youtube_search_url: String,
    /// Postgres connection string; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub port: u16,
    pub fetch_interval: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `YOUTUBE_API_KEY`: YouTube Data API key
    /// - `YOUTUBE_SEARCH_URL`: search endpoint (default: the public v3 endpoint)
    /// - `DATABASE_URL`: Postgres URL (default: in-memory storage)
    /// - `PORT`: listen port (default: 3000)
    /// - `FETCH_INTERVAL_SECS`: seconds between ingestion cycles (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let youtube_api_key = lookup("YOUTUBE_API_KEY").unwrap_or_else(|| {
            warn!("YOUTUBE_API_KEY is not set; ingestion requests will be rejected upstream");
            String::new()
        });

        let youtube_search_url =
            lookup("YOUTUBE_SEARCH_URL").unwrap_or_else(|| YOUTUBE_SEARCH_URL.to_string());

        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let interval_secs = match lookup("FETCH_INTERVAL_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidInterval(raw))?,
            None => DEFAULT_FETCH_INTERVAL_SECS,
        };

        Ok(Self {
            youtube_api_key,
            youtube_search_url,
            database_url,
            port,
            fetch_interval: Duration::from_secs(interval_secs),
        })
    }
}
