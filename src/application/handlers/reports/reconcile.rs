//! Reconciliation of a requested workplace filter against the accessible set.

use std::collections::HashSet;

use crate::domain::foundation::WorkplaceId;

/// Outcome of intersecting a requested filter with the accessible set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkplaceReconciliation {
    /// Workplaces the report may cover, in request order (or accessible
    /// order when no filter was requested).
    pub granted: Vec<WorkplaceId>,
    /// Requested workplaces the caller cannot access.
    pub denied: Vec<WorkplaceId>,
}

impl WorkplaceReconciliation {
    /// True when nothing is left to report on.
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

/// Intersects `requested` with `accessible`.
///
/// An empty `requested` list means "no filter": every accessible workplace is
/// granted. Otherwise the result keeps `requested` order, treating
/// `accessible` purely as a membership set.
pub fn reconcile_workplaces(
    requested: &[WorkplaceId],
    accessible: &[WorkplaceId],
) -> WorkplaceReconciliation {
    if requested.is_empty() {
        return WorkplaceReconciliation {
            granted: accessible.to_vec(),
            denied: Vec::new(),
        };
    }

    let accessible: HashSet<&WorkplaceId> = accessible.iter().collect();
    let (granted, denied) = requested
        .iter()
        .cloned()
        .partition(|id| accessible.contains(id));

    WorkplaceReconciliation { granted, denied }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(names: &[&str]) -> Vec<WorkplaceId> {
        names.iter().map(|n| WorkplaceId::new(*n).unwrap()).collect()
    }

    #[test]
    fn no_filter_grants_everything_accessible() {
        let result = reconcile_workplaces(&[], &ids(&["wp1", "wp2", "wp3"]));
        assert_eq!(result.granted, ids(&["wp1", "wp2", "wp3"]));
        assert!(result.denied.is_empty());
    }

    #[test]
    fn no_filter_and_nothing_accessible_is_empty() {
        let result = reconcile_workplaces(&[], &[]);
        assert!(result.is_empty());
    }

    #[test]
    fn filter_is_intersected_with_accessible_set() {
        let result = reconcile_workplaces(&ids(&["c", "d"]), &ids(&["a", "b", "c"]));
        assert_eq!(result.granted, ids(&["c"]));
        assert_eq!(result.denied, ids(&["d"]));
    }

    #[test]
    fn disjoint_filter_grants_nothing() {
        let result = reconcile_workplaces(&ids(&["d", "e"]), &ids(&["a", "b", "c"]));
        assert!(result.is_empty());
        assert_eq!(result.denied, ids(&["d", "e"]));
    }

    #[test]
    fn granted_follows_requested_order() {
        let result = reconcile_workplaces(&ids(&["c", "a"]), &ids(&["a", "b", "c"]));
        assert_eq!(result.granted, ids(&["c", "a"]));
    }

    fn workplace_ids(max: usize) -> impl Strategy<Value = Vec<WorkplaceId>> {
        proptest::collection::vec("wp[0-5]", 0..max)
            .prop_map(|names| names.into_iter().map(|n| WorkplaceId::new(n).unwrap()).collect())
    }

    proptest! {
        #[test]
        fn granted_and_denied_partition_the_request(
            requested in workplace_ids(8),
            accessible in workplace_ids(8),
        ) {
            let result = reconcile_workplaces(&requested, &accessible);

            if requested.is_empty() {
                prop_assert_eq!(&result.granted, &accessible);
                prop_assert!(result.denied.is_empty());
            } else {
                prop_assert_eq!(result.granted.len() + result.denied.len(), requested.len());
                for id in &result.granted {
                    prop_assert!(accessible.contains(id));
                }
                for id in &result.denied {
                    prop_assert!(!accessible.contains(id));
                }
                let expected: Vec<_> = requested
                    .iter()
                    .filter(|id| accessible.contains(id))
                    .cloned()
                    .collect();
                prop_assert_eq!(&result.granted, &expected);
            }
        }
    }
}
