//! API key authentication configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::domain::foundation::CallerId;

/// Minimum API key length accepted in production.
pub const MIN_PRODUCTION_API_KEY_LEN: usize = 32;

/// API key authentication configuration
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Shared key expected in the `X-API-KEY` header
    pub api_key: Secret<String>,

    /// Caller identity the key acts as; absent means anonymous access
    #[serde(default)]
    pub api_key_caller: Option<String>,
}

impl AuthConfig {
    /// Parsed caller identity for the API key, if configured.
    pub fn caller(&self) -> Result<Option<CallerId>, ValidationError> {
        self.api_key_caller
            .as_deref()
            .map(|id| CallerId::new(id).map_err(|_| ValidationError::InvalidApiKeyCaller))
            .transpose()
    }

    /// Validate authentication configuration
    ///
    /// The key must be present. In production it must also be long enough to
    /// resist guessing.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let key_len = self.api_key.expose_secret().len();
        if key_len == 0 {
            return Err(ValidationError::MissingRequired("AUTH__API_KEY"));
        }
        if *environment == Environment::Production && key_len < MIN_PRODUCTION_API_KEY_LEN {
            return Err(ValidationError::ApiKeyTooShort {
                min: MIN_PRODUCTION_API_KEY_LEN,
            });
        }
        self.caller()?;
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: Secret::new(String::new()),
            api_key_caller: None,
        }
    }
}
