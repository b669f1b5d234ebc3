//! HTTP adapters - REST API implementations.
//!
//! - `export` - report bundle download endpoint
//! - `middleware` - API key authentication
//! - `server` - listener binding and serving

pub mod export;
pub mod middleware;
pub mod server;

// Re-export key types for convenience
pub use export::{export_app, export_routes, ExportAppState};
pub use middleware::{ApiCaller, ApiKeyState};
