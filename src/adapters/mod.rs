//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `workplace` - Workplace access resolution (in-memory directory)
//! - `reports` - Report producers (sample data, timeout and caching decorators)
//! - `cache` - Report caches (in-memory, Redis)
//! - `lock` - Distributed locks (in-memory, Redis)
//! - `export` - Report bundle exporters
//! - `http` - Axum export endpoint
//! - `redis_connection` - Redis connection setup shared by cache and lock

pub mod cache;
pub mod export;
pub mod http;
pub mod lock;
pub mod redis_connection;
pub mod reports;
pub mod workplace;

pub use cache::{InMemoryReportCache, RedisReportCache};
pub use export::JsonBundleExporter;
pub use lock::{InMemoryDistributedLock, RedisDistributedLock};
pub use reports::{CachingReportProducer, SampleReportProducer, TimeoutReportProducer};
pub use workplace::{InMemoryWorkplaceResolver, WorkplaceDirectory};
