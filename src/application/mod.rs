//! Application layer - Use case handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{GenerateDashboardReportHandler, DEFAULT_MAX_CONCURRENT_REPORTS};
