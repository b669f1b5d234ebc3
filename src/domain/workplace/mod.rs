//! Workplace - the access-scoped entity reports are filtered by.

use serde::{Deserialize, Serialize};

use super::foundation::WorkplaceId;

/// A workplace visible to some set of callers.
///
/// Immutable value; its lifecycle belongs to whichever adapter implements
/// the `WorkplaceResolver` port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workplace {
    id: WorkplaceId,
    name: String,
}

impl Workplace {
    pub fn new(id: WorkplaceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> &WorkplaceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
