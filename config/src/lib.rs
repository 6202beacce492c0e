//! # Configuration Management for GeoHaus
//!
//! This crate provides centralized configuration structures for all GeoHaus components,
//! covering the Redis cache backend and logging settings.
//!
//! ## Quick Start
//!
//! ### Programmatic Configuration
//! ```rust
//! use config::CacheConfig;
//!
//! let cache_config = CacheConfig::new("redis://localhost:6379".to_string())
//!     .with_key_prefix("koop");
//! assert_eq!(cache_config.features_hash(), "koop:features");
//! ```
//!
//! ### TOML File Configuration
//! ```toml
//! [cache]
//! redis_url = "redis://localhost:6379"
//! key_prefix = ""
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Load configuration:
//! ```rust,no_run
//! use config::AppConfig;
//!
//! // Load from geohaus.toml (or the path in GEOHAUS_CONFIG)
//! let config = AppConfig::load()?;
//!
//! // Or load from custom path
//! let config = AppConfig::from_file("config/production.toml")?;
//! # Ok::<(), config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::{env, path::Path};
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "./geohaus.toml";
const CONFIG_PATH_VAR: &str = "GEOHAUS_CONFIG";

const FEATURES_HASH: &str = "features";
const METADATA_HASH: &str = "metadata";

const REDIS_SCHEMES: [&str; 4] = ["redis://", "rediss://", "redis+unix://", "unix://"];
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Redis cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection string (redis://localhost:6379)
    pub redis_url: String,

    /// Namespace for the feature and metadata hashes. Empty keeps the bare
    /// `features` / `metadata` hash names.
    #[serde(default)]
    pub key_prefix: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from the TOML file named in .env / the environment, or defaults
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the variables may come from the process environment.
        dotenvy::dotenv().ok();

        let config = if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::from_file(&config_path)
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::from_file(DEFAULT_CONFIG_PATH)
        } else {
            Err(ConfigError::Invalid(format!(
                "Config path must be specified in .env file as {} or in {} file",
                CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH
            )))
        }?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Unknown logging level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Create a new cache configuration
    pub fn new(redis_url: String) -> Self {
        Self {
            redis_url,
            key_prefix: String::new(),
        }
    }

    pub fn with_key_prefix(mut self, key_prefix: &str) -> Self {
        self.key_prefix = key_prefix.to_string();
        self
    }

    /// Name of the hash holding feature records
    pub fn features_hash(&self) -> String {
        self.namespaced(FEATURES_HASH)
    }

    /// Name of the hash holding metadata records
    pub fn metadata_hash(&self) -> String {
        self.namespaced(METADATA_HASH)
    }

    fn namespaced(&self, hash: &str) -> String {
        if self.key_prefix.is_empty() {
            hash.to_string()
        } else {
            format!("{}:{}", self.key_prefix, hash)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.redis_url.is_empty() {
            return Err(ConfigError::Invalid("Redis URL cannot be empty".to_string()));
        }
        if !REDIS_SCHEMES
            .iter()
            .any(|scheme| self.redis_url.starts_with(scheme))
        {
            return Err(ConfigError::Invalid(format!(
                "Redis URL must start with one of {:?}",
                REDIS_SCHEMES
            )));
        }
        if self.key_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid(
                "Cache key_prefix cannot contain whitespace".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new("redis://localhost:6379".to_string())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
