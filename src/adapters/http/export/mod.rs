//! Dashboard export HTTP adapter module.
//!
//! Provides the `GET /dashboard/data/exporter` download endpoint.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, ExportParams};
pub use handlers::{ExportApiError, ExportAppState};
pub use routes::{export_app, export_routes, EXPORT_PATH};
