//! Report producer adapters.
//!
//! - `SampleReportProducer` - deterministic demo data for the library dashboards
//! - `TimeoutReportProducer` - bounds each call to an inner producer
//! - `CachingReportProducer` - read-through cache with optional recompute lock
//!
//! `producer_stack` assembles the decorators from `ReportsConfig`.

mod caching_producer;
mod sample_producer;
mod stack;
mod timeout_producer;

pub use caching_producer::{cache_key, CachingReportProducer};
pub use sample_producer::{SampleReportProducer, SAMPLE_REPORT_KEYS};
pub use stack::producer_stack;
pub use timeout_producer::TimeoutReportProducer;
