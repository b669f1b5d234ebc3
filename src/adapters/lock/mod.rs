//! Distributed lock adapters.
//!
//! - `InMemoryDistributedLock` - process-local leases for tests and development
//! - `RedisDistributedLock` - `SET NX PX` leases with owner-checked release

mod in_memory;
mod redis;

pub use self::in_memory::InMemoryDistributedLock;
pub use self::redis::RedisDistributedLock;

use std::time::{Duration, Instant};

/// Delay between acquisition attempts while waiting for a held lock.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Deadline `wait` from now; `None` when it is too far out to represent.
fn deadline_after(wait: Duration) -> Option<Instant> {
    Instant::now().checked_add(wait)
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|at| Instant::now() >= at)
}
