//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `api_key` - Shared-key authentication and the caller extractor

pub mod api_key;

pub use api_key::{api_key_middleware, ApiCaller, ApiKeyRejection, ApiKeyState, API_KEY_HEADER};
