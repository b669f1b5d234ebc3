//! Report handlers.
//!
//! The aggregation use case and its workplace filter reconciliation.

mod generate_dashboard_report;
mod reconcile;

pub use generate_dashboard_report::{
    GenerateDashboardReportHandler, DEFAULT_MAX_CONCURRENT_REPORTS,
};
pub use reconcile::{reconcile_workplaces, WorkplaceReconciliation};
