//! Application handlers.
//!
//! Use case handlers that orchestrate ports.

pub mod reports;

pub use reports::{
    reconcile_workplaces, GenerateDashboardReportHandler, WorkplaceReconciliation,
    DEFAULT_MAX_CONCURRENT_REPORTS,
};
