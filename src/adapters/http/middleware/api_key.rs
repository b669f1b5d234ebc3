//! API key middleware and caller extractor for axum.
//!
//! ```text
//! Request → api_key_middleware → checks X-API-KEY, injects ApiCaller into extensions
//!                                      ↓
//!                              Handler → ApiCaller extractor reads from extensions
//! ```
//!
//! The key is compared in constant time. A valid key maps to the caller
//! identity configured for it, or to anonymous access when none is set.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get, middleware};
//!
//! let state = ApiKeyState::new(Secret::new("key".to_string()), None);
//!
//! let app = Router::new()
//!     .route("/protected", get(handler))
//!     .route_layer(middleware::from_fn_with_state(state, api_key_middleware));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::adapters::http::export::dto::ErrorResponse;
use crate::config::{AuthConfig, ValidationError};
use crate::domain::foundation::CallerId;

/// Header carrying the shared API key.
pub const API_KEY_HEADER: &str = "X-API-KEY";

const INVALID_KEY_MESSAGE: &str = "Invalid or missing API Key";

/// Middleware state: the expected key and the caller it acts as.
#[derive(Clone)]
pub struct ApiKeyState {
    api_key: Arc<Secret<String>>,
    caller: Option<CallerId>,
}

impl ApiKeyState {
    pub fn new(api_key: Secret<String>, caller: Option<CallerId>) -> Self {
        Self {
            api_key: Arc::new(api_key),
            caller,
        }
    }

    /// Builds the state from validated auth configuration.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ValidationError> {
        Ok(Self::new(
            Secret::new(config.api_key.expose_secret().clone()),
            config.caller()?,
        ))
    }

    fn matches(&self, provided: &str) -> bool {
        let expected = self.api_key.expose_secret();
        // An unset key never authenticates, not even an empty header.
        !expected.is_empty() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
    }
}

impl std::fmt::Debug for ApiKeyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyState")
            .field("caller", &self.caller)
            .finish_non_exhaustive()
    }
}

/// Caller identity established by [`api_key_middleware`].
///
/// `ApiCaller(None)` is an authenticated request with anonymous access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCaller(pub Option<CallerId>);

/// Rejects requests whose `X-API-KEY` header is missing or wrong with
/// 401 Unauthorized; otherwise injects [`ApiCaller`] and continues.
pub async fn api_key_middleware(
    State(state): State<ApiKeyState>,
    mut request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if state.matches(key) => {
            request
                .extensions_mut()
                .insert(ApiCaller(state.caller.clone()));
            next.run(request).await
        }
        Some(_) => {
            warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            ApiKeyRejection::InvalidKey.into_response()
        }
        None => {
            warn!(path = %request.uri().path(), "Rejected request without API key");
            ApiKeyRejection::InvalidKey.into_response()
        }
    }
}

impl<S> axum::extract::FromRequestParts<S> for ApiCaller
where
    S: Send + Sync,
{
    type Rejection = ApiKeyRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<ApiCaller>()
                .cloned()
                .ok_or(ApiKeyRejection::InvalidKey)
        })
    }
}

/// Rejection type for API key failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyRejection {
    /// Missing, malformed or wrong key.
    InvalidKey,
}

impl IntoResponse for ApiKeyRejection {
    fn into_response(self) -> Response {
        match self {
            ApiKeyRejection::InvalidKey => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::unauthorized(INVALID_KEY_MESSAGE)),
            )
                .into_response(),
        }
    }
}
