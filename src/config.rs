use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// TVMaze catalog API base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Connect timeout for catalog requests, in seconds
    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_connect_timeout_secs: u64,

    /// Read timeout for catalog requests, in seconds
    #[serde(default = "default_catalog_timeout_secs")]
    pub catalog_read_timeout_secs: u64,

    /// Cached shows older than this are eligible for eviction
    #[serde(default = "default_cache_max_age_hours")]
    pub cache_max_age_hours: i64,

    /// How often the eviction pass runs
    #[serde(default = "default_cache_eviction_interval_secs")]
    pub cache_eviction_interval_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_database_url() -> String {
    "sqlite://media_finder.db?mode=rwc".to_string()
}

fn default_catalog_api_url() -> String {
    "https://api.tvmaze.com".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    30
}

fn default_cache_max_age_hours() -> i64 {
    24 * 7
}

fn default_cache_eviction_interval_secs() -> u64 {
    3600
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn catalog_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_connect_timeout_secs)
    }

    pub fn catalog_read_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_read_timeout_secs)
    }

    pub fn cache_max_age(&self) -> chrono::Duration {
        chrono::Duration::try_hours(self.cache_max_age_hours).unwrap_or(chrono::Duration::MAX)
    }

    pub fn cache_eviction_interval(&self) -> Duration {
        Duration::from_secs(self.cache_eviction_interval_secs.max(1))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
