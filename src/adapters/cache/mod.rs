//! Report cache adapters.
//!
//! - `InMemoryReportCache` - TTL-aware map for tests and single-process use
//! - `RedisReportCache` - shared cache for multi-instance deployments

mod in_memory;
mod redis;

pub use self::in_memory::InMemoryReportCache;
pub use self::redis::RedisReportCache;
