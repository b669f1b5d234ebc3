//! Workplace access resolution adapters.

mod in_memory;

pub use in_memory::{InMemoryWorkplaceResolver, WorkplaceDirectory};
