//! Domain layer containing business types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, validation errors)
//! - `workplace` - Access-scoped workplaces
//! - `report` - Report requests, periods, and the aggregated output model

pub mod foundation;
pub mod report;
pub mod workplace;
