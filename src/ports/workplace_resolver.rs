//! Workplace resolver port - which workplaces a caller may see.
//!
//! The aggregation handler depends on this port to decide which workplaces
//! a report may cover. Authorization policy lives entirely in the adapter.
//!
//! # Contract
//!
//! - Known caller: exactly the workplaces that caller may access.
//! - Unknown caller: an empty list. There is no implicit access.
//! - No caller: an adapter-defined default set (for example every
//!   non-restricted workplace). This is a permissive fallback intended for
//!   system contexts; expose it to end users with care.
//!
//! Lookups never mutate state. Errors are transport-level failures and must
//! be propagated, never swallowed into an empty list.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{CallerId, WorkplaceId};
use crate::domain::workplace::Workplace;

/// Port for resolving the workplaces visible to a caller.
#[async_trait]
pub trait WorkplaceResolver: Send + Sync {
    /// Returns the workplaces `caller` may access, in resolver order.
    async fn resolve_accessible(
        &self,
        caller: Option<&CallerId>,
    ) -> Result<Vec<Workplace>, AccessResolutionError>;

    /// Looks up a single workplace regardless of caller.
    async fn find_by_id(
        &self,
        workplace_id: &WorkplaceId,
    ) -> Result<Option<Workplace>, AccessResolutionError>;
}

/// Errors from the workplace resolver.
///
/// Any of these is fatal to a report request: without an accessible set no
/// safe filtering decision can be made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessResolutionError {
    #[error("Workplace directory unavailable: {0}")]
    Unavailable(String),

    #[error("Workplace directory lookup timed out")]
    Timeout,

    #[error("Workplace directory returned invalid data: {0}")]
    InvalidData(String),
}
