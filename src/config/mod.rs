//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DASHBOARD_EXPORTER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use dashboard_exporter::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Reports run {} at a time", config.reports.max_concurrent_reports);
//! ```

mod auth;
mod error;
mod redis;
mod reports;
mod server;

pub use self::auth::{AuthConfig, MIN_PRODUCTION_API_KEY_LEN};
pub use self::error::{ConfigError, ValidationError};
pub use self::redis::RedisConfig;
pub use self::reports::{ReportsConfig, MAX_CONCURRENT_REPORTS_LIMIT};
pub use self::server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Report generation (concurrency, timeouts, caching)
    #[serde(default)]
    pub reports: ReportsConfig,

    /// API key authentication
    pub auth: AuthConfig,

    /// Redis for shared cache and locks; in-memory adapters are used when absent
    #[serde(default)]
    pub redis: Option<RedisConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DASHBOARD_EXPORTER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DASHBOARD_EXPORTER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DASHBOARD_EXPORTER__REPORTS__MAX_CONCURRENT_REPORTS=8` -> `reports.max_concurrent_reports = 8`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DASHBOARD_EXPORTER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.reports.validate()?;
        self.auth.validate(&self.server.environment)?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
