//! Application configuration management.

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Posting policy configuration.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Read-through cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
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
    /// Statement timeout applied to every unit of work, in milliseconds.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_statement_timeout_ms() -> u64 {
    5_000
}

/// Policies applied by the posting engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostingConfig {
    /// Allow stock quantities to go below zero (backorders).
    #[serde(default)]
    pub allow_negative_stock: bool,
    /// Resolve a missing supplier account to the entity's first supplier account.
    #[serde(default = "default_true")]
    pub supplier_fallback: bool,
    /// Reject movements whose journal entry would otherwise be skipped.
    #[serde(default)]
    pub strict_linkage: bool,
    /// Currency of stock valuation entries when a movement names none.
    #[serde(default = "default_currency")]
    pub default_currency: String,
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            allow_negative_stock: false,
            supplier_fallback: true,
            strict_linkage: false,
            default_currency: default_currency(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Read-through cache configuration.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entities whose account lists are cached.
    #[serde(default = "default_account_capacity")]
    pub account_capacity: u64,
    /// Time-to-live of a cached account list, in seconds.
    #[serde(default = "default_account_ttl_secs")]
    pub account_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            account_capacity: default_account_capacity(),
            account_ttl_secs: default_account_ttl_secs(),
        }
    }
}

fn default_account_capacity() -> u64 {
    256
}

fn default_account_ttl_secs() -> u64 {
    300 // 5 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("STOCKLEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        let currency = &self.posting.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(AppError::Config(format!(
                "posting.default_currency must be a 3-letter ISO code, got {currency:?}"
            )));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::Config(
                "database.min_connections exceeds database.max_connections".to_string(),
            ));
        }
        Ok(())
    }
}
