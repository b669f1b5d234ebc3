//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("max_concurrent_reports must be between 1 and {max}")]
    InvalidConcurrency { max: usize },

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("API key must be at least {min} characters in production")]
    ApiKeyTooShort { min: usize },

    #[error("Invalid API key caller id")]
    InvalidApiKeyCaller,
}
