//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Inventory engine configuration.
    #[serde(default)]
    pub inventory: InventoryConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait when acquiring a pooled connection.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Milliseconds a write transaction may wait on a balance row lock.
    #[serde(default = "default_lock_timeout")]
    pub lock_timeout_ms: u64,
    /// Log every SQL statement.
    #[serde(default)]
    pub sqlx_logging: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    8
}

fn default_lock_timeout() -> u64 {
    5_000
}

impl DatabaseConfig {
    /// Creates a configuration for the given URL with default pool settings.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            lock_timeout_ms: default_lock_timeout(),
            sqlx_logging: false,
        }
    }
}

/// Inventory engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Page size used by the ledger view when the caller gives none.
    #[serde(default = "default_ledger_page_size")]
    pub ledger_page_size: u32,
    /// Upper bound on the ledger view page size.
    #[serde(default = "default_ledger_max_page_size")]
    pub ledger_max_page_size: u32,
    /// Attempts per write operation; 1 disables retries.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Backoff before the first retry, doubled on every further attempt.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

fn default_ledger_page_size() -> u32 {
    100
}

fn default_ledger_max_page_size() -> u32 {
    500
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    25
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            ledger_page_size: default_ledger_page_size(),
            ledger_max_page_size: default_ledger_max_page_size(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STOCKLEDGER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
