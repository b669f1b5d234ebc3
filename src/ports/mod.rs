//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application core and the outside world. Adapters implement these ports.
//!
//! ## Core Ports
//!
//! - `WorkplaceResolver` - Workplaces visible to a caller
//! - `ReportProducer` - Raw rows for a single report key
//!
//! ## Infrastructure Ports
//!
//! - `ReportCache` - Key/value cache for produced report data
//! - `DistributedLock` - Leased named locks across instances
//! - `ReportExporter` - Serialization of aggregated reports

mod distributed_lock;
mod report_cache;
mod report_exporter;
mod report_producer;
mod workplace_resolver;

pub use distributed_lock::{DistributedLock, LockError, LockToken};
pub use report_cache::{CacheError, ReportCache};
pub use report_exporter::{ExportError, ReportExporter};
pub use report_producer::{ProducerError, ReportData, ReportProducer};
pub use workplace_resolver::{AccessResolutionError, WorkplaceResolver};
