//! In-memory workplace directory and resolver.
//!
//! Holds workplaces, per-caller grants and a restricted set in memory.
//! Useful for testing, development and demos.
//!
//! # Usage
//!
//! ```ignore
//! use dashboard_exporter::adapters::workplace::{InMemoryWorkplaceResolver, WorkplaceDirectory};
//!
//! let resolver = InMemoryWorkplaceResolver::new(WorkplaceDirectory::sample());
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::foundation::{CallerId, WorkplaceId};
use crate::domain::workplace::Workplace;
use crate::ports::{AccessResolutionError, WorkplaceResolver};

/// Directory of workplaces and the grants that scope them.
///
/// Identified callers see exactly the workplaces granted to them. Anonymous
/// callers see every workplace that is not restricted. Results follow
/// directory insertion order, and grants naming unknown workplaces are inert.
#[derive(Debug, Clone, Default)]
pub struct WorkplaceDirectory {
    workplaces: Vec<Workplace>,
    restricted: HashSet<WorkplaceId>,
    grants: HashMap<CallerId, HashSet<WorkplaceId>>,
}

impl WorkplaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo directory: four library workplaces, the last one restricted.
    ///
    /// | caller     | workplaces          |
    /// |------------|---------------------|
    /// | `user123`  | wp1, wp2, wp3       |
    /// | `user456`  | wp2, wp3            |
    /// | `admin789` | wp1, wp2, wp3, wp4  |
    /// | anonymous  | wp1, wp2, wp3       |
    pub fn sample() -> Self {
        let mut directory = Self::new();
        for (id, name) in [
            ("wp1", "Main Library"),
            ("wp2", "Downtown Branch"),
            ("wp3", "Westside Annex"),
        ] {
            if let Ok(id) = WorkplaceId::new(id) {
                directory.add_workplace(Workplace::new(id, name));
            }
        }
        if let Ok(id) = WorkplaceId::new("wp4") {
            directory.add_restricted_workplace(Workplace::new(
                id,
                "Special Collections (Restricted)",
            ));
        }

        for (caller, ids) in [
            ("user123", &["wp1", "wp2", "wp3"][..]),
            ("user456", &["wp2", "wp3"][..]),
            ("admin789", &["wp1", "wp2", "wp3", "wp4"][..]),
        ] {
            if let Ok(caller) = CallerId::new(caller) {
                let ids = ids.iter().filter_map(|id| WorkplaceId::new(*id).ok());
                directory.grant(caller, ids);
            }
        }
        directory
    }

    /// Adds a workplace visible to anonymous callers. Replaces any existing
    /// workplace with the same id in place.
    pub fn add_workplace(&mut self, workplace: Workplace) {
        self.restricted.remove(workplace.id());
        self.upsert(workplace);
    }

    /// Adds a workplace only reachable through an explicit grant.
    pub fn add_restricted_workplace(&mut self, workplace: Workplace) {
        self.restricted.insert(workplace.id().clone());
        self.upsert(workplace);
    }

    /// Grants `caller` access to the given workplaces, in addition to any
    /// existing grants.
    pub fn grant(&mut self, caller: CallerId, workplace_ids: impl IntoIterator<Item = WorkplaceId>) {
        self.grants.entry(caller).or_default().extend(workplace_ids);
    }

    /// Removes all of `caller`'s grants.
    pub fn revoke_all(&mut self, caller: &CallerId) {
        self.grants.remove(caller);
    }

    pub fn with_workplace(mut self, workplace: Workplace) -> Self {
        self.add_workplace(workplace);
        self
    }

    pub fn with_restricted_workplace(mut self, workplace: Workplace) -> Self {
        self.add_restricted_workplace(workplace);
        self
    }

    pub fn with_grant(
        mut self,
        caller: CallerId,
        workplace_ids: impl IntoIterator<Item = WorkplaceId>,
    ) -> Self {
        self.grant(caller, workplace_ids);
        self
    }

    /// Workplaces visible to `caller`, in directory order.
    pub fn accessible_to(&self, caller: Option<&CallerId>) -> Vec<Workplace> {
        match caller {
            Some(caller) => match self.grants.get(caller) {
                Some(granted) => self
                    .workplaces
                    .iter()
                    .filter(|w| granted.contains(w.id()))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            },
            None => self
                .workplaces
                .iter()
                .filter(|w| !self.restricted.contains(w.id()))
                .cloned()
                .collect(),
        }
    }

    pub fn get(&self, workplace_id: &WorkplaceId) -> Option<&Workplace> {
        self.workplaces.iter().find(|w| w.id() == workplace_id)
    }

    pub fn is_restricted(&self, workplace_id: &WorkplaceId) -> bool {
        self.restricted.contains(workplace_id)
    }

    pub fn len(&self) -> usize {
        self.workplaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workplaces.is_empty()
    }

    fn upsert(&mut self, workplace: Workplace) {
        match self.workplaces.iter_mut().find(|w| w.id() == workplace.id()) {
            Some(existing) => *existing = workplace,
            None => self.workplaces.push(workplace),
        }
    }
}

/// WorkplaceResolver backed by a shared in-memory [`WorkplaceDirectory`].
///
/// Cloning shares the directory, so grants added through one handle are
/// visible to all.
#[derive(Debug, Clone)]
pub struct InMemoryWorkplaceResolver {
    directory: Arc<RwLock<WorkplaceDirectory>>,
    failure: Arc<RwLock<Option<AccessResolutionError>>>,
}

impl Default for InMemoryWorkplaceResolver {
    fn default() -> Self {
        Self::new(WorkplaceDirectory::new())
    }
}

impl InMemoryWorkplaceResolver {
    pub fn new(directory: WorkplaceDirectory) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
            failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Resolver over [`WorkplaceDirectory::sample`].
    pub fn sample() -> Self {
        Self::new(WorkplaceDirectory::sample())
    }

    /// Resolver whose every lookup fails with `error` (for testing failure flows).
    pub fn failing(error: AccessResolutionError) -> Self {
        Self {
            directory: Arc::new(RwLock::new(WorkplaceDirectory::new())),
            failure: Arc::new(RwLock::new(Some(error))),
        }
    }

    /// Sets or clears the simulated failure.
    pub async fn set_failure(&self, error: Option<AccessResolutionError>) {
        *self.failure.write().await = error;
    }

    /// Grants `caller` access to additional workplaces.
    pub async fn grant(&self, caller: CallerId, workplace_ids: impl IntoIterator<Item = WorkplaceId>) {
        self.directory.write().await.grant(caller, workplace_ids);
    }

    pub async fn add_workplace(&self, workplace: Workplace) {
        self.directory.write().await.add_workplace(workplace);
    }

    async fn check_failure(&self) -> Result<(), AccessResolutionError> {
        match self.failure.read().await.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WorkplaceResolver for InMemoryWorkplaceResolver {
    async fn resolve_accessible(
        &self,
        caller: Option<&CallerId>,
    ) -> Result<Vec<Workplace>, AccessResolutionError> {
        self.check_failure().await?;
        let workplaces = self.directory.read().await.accessible_to(caller);
        debug!(
            caller = caller.map(CallerId::as_str).unwrap_or("<anonymous>"),
            count = workplaces.len(),
            "Resolved accessible workplaces"
        );
        Ok(workplaces)
    }

    async fn find_by_id(
        &self,
        workplace_id: &WorkplaceId,
    ) -> Result<Option<Workplace>, AccessResolutionError> {
        self.check_failure().await?;
        Ok(self.directory.read().await.get(workplace_id).cloned())
    }
}
