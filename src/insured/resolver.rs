//! Traversal over an ordered list of insured entities
//!
//! All functions are pure and never reorder the list. Traversal is
//! one-directional: nothing wraps around from the end to the start.

use serde::Serialize;

use super::InsuredEntityRef;
use crate::verdict::Violation;

/// Position of the entity with `key`, if present
pub fn resolve_current_index(list: &[InsuredEntityRef], key: Option<&str>) -> Option<usize> {
    let key = key?;
    list.iter().position(|e| e.key == key)
}

/// First incomplete entity at or after `start`
pub fn resolve_next_incomplete(list: &[InsuredEntityRef], start: usize) -> Option<&InsuredEntityRef> {
    list.get(start..)?.iter().find(|e| !e.is_complete)
}

/// Entity at `index + delta`, or `None` when that falls outside the list
pub fn resolve_adjacent(list: &[InsuredEntityRef], index: usize, delta: isize) -> Option<&InsuredEntityRef> {
    list.get(index.checked_add_signed(delta)?)
}

/// Where the UI should go after finishing with an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "target", rename_all = "camelCase")]
pub enum TraversalTarget {
    /// Edit screen of this entity
    Entity { entity: InsuredEntityRef },

    /// Nothing left to complete; continue with the configured default route
    Default { route: String },

    /// Left the per-entity sub-flow; back to the summary screen
    Summary { route: String, index: usize, delta: isize },
}

impl TraversalTarget {
    /// Navigation value of the entity, or the fallback route
    pub fn destination(&self) -> &str {
        match self {
            TraversalTarget::Entity { entity } => &entity.navigation_value,
            TraversalTarget::Default { route } | TraversalTarget::Summary { route, .. } => route,
        }
    }

    pub fn entity(&self) -> Option<&InsuredEntityRef> {
        match self {
            TraversalTarget::Entity { entity } => Some(entity),
            _ => None,
        }
    }

    /// Out-of-bounds traversal, if this target is the summary fallback
    pub fn violation(&self) -> Option<Violation> {
        match *self {
            TraversalTarget::Summary { index, delta, .. } => {
                Some(Violation::OutOfBoundsTraversal { index, delta })
            }
            _ => None,
        }
    }
}

/// Next incomplete entity after the current one, or the default route
///
/// With no current key (or one not in the list) the search starts at the
/// beginning.
pub fn next_target(
    list: &[InsuredEntityRef],
    current_key: Option<&str>,
    default_route: &str,
) -> TraversalTarget {
    let start = resolve_current_index(list, current_key).map_or(0, |i| i + 1);

    match resolve_next_incomplete(list, start) {
        Some(entity) => TraversalTarget::Entity {
            entity: entity.clone(),
        },
        None => TraversalTarget::Default {
            route: default_route.to_string(),
        },
    }
}

/// Previous/next entity relative to `index`, or the summary screen
pub fn adjacent_target(
    list: &[InsuredEntityRef],
    index: usize,
    delta: isize,
    summary_route: &str,
) -> TraversalTarget {
    match resolve_adjacent(list, index, delta) {
        Some(entity) => TraversalTarget::Entity {
            entity: entity.clone(),
        },
        None => TraversalTarget::Summary {
            route: summary_route.to_string(),
            index,
            delta,
        },
    }
}

/// Completion counts over a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraversalProgress {
    pub complete: usize,
    pub total: usize,
}

impl TraversalProgress {
    pub fn remaining(&self) -> usize {
        self.total - self.complete
    }

    pub fn is_finished(&self) -> bool {
        self.complete == self.total
    }
}

pub fn progress(list: &[InsuredEntityRef]) -> TraversalProgress {
    TraversalProgress {
        complete: list.iter().filter(|e| e.is_complete).count(),
        total: list.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insured::InsuredKind;
    use crate::verdict::ViolationKind;

    fn entity(key: &str, kind: InsuredKind, complete: bool) -> InsuredEntityRef {
        InsuredEntityRef::new(key, kind, complete, format!("nav-{}", key))
    }

    fn sample() -> Vec<InsuredEntityRef> {
        vec![
            entity("MI", InsuredKind::Individual, false),
            entity("SP", InsuredKind::Individual, true),
            entity("CAR", InsuredKind::Object, false),
            entity("TRIP", InsuredKind::Event, true),
        ]
    }

    #[test]
    fn test_resolve_current_index() {
        let list = sample();
        assert_eq!(resolve_current_index(&list, Some("CAR")), Some(2));
        assert_eq!(resolve_current_index(&list, Some("XX")), None);
        assert_eq!(resolve_current_index(&list, None), None);
    }

    #[test]
    fn test_next_incomplete_from_start() {
        let list = vec![
            entity("MI", InsuredKind::Individual, false),
            entity("SP", InsuredKind::Individual, true),
        ];
        assert_eq!(resolve_next_incomplete(&list, 0).map(|e| e.key.as_str()), Some("MI"));
    }

    #[test]
    fn test_next_incomplete_does_not_wrap() {
        let list = sample();
        assert_eq!(resolve_next_incomplete(&list, 1).map(|e| e.key.as_str()), Some("CAR"));
        assert!(resolve_next_incomplete(&list, 3).is_none());
        assert!(resolve_next_incomplete(&list, 10).is_none());
    }

    #[test]
    fn test_adjacent_bounds() {
        let list = sample();
        assert_eq!(resolve_adjacent(&list, 1, 1).map(|e| e.key.as_str()), Some("CAR"));
        assert_eq!(resolve_adjacent(&list, 1, -1).map(|e| e.key.as_str()), Some("MI"));
        assert!(resolve_adjacent(&list, 0, -1).is_none());
        assert!(resolve_adjacent(&list, 3, 1).is_none());
    }

    #[test]
    fn test_empty_list_queries() {
        let list: Vec<InsuredEntityRef> = Vec::new();
        assert_eq!(resolve_current_index(&list, Some("MI")), None);
        assert!(resolve_next_incomplete(&list, 0).is_none());
        assert!(resolve_adjacent(&list, 0, 0).is_none());
        assert_eq!(
            next_target(&list, None, "/summary"),
            TraversalTarget::Default { route: "/summary".to_string() }
        );
        assert!(progress(&list).is_finished());
    }

    #[test]
    fn test_next_target_skips_past_current() {
        let list = sample();

        let target = next_target(&list, Some("MI"), "/coverage-variants");
        assert_eq!(target.destination(), "nav-CAR");

        let target = next_target(&list, Some("CAR"), "/coverage-variants");
        assert_eq!(
            target,
            TraversalTarget::Default { route: "/coverage-variants".to_string() }
        );

        // Unknown current key starts from the top
        let target = next_target(&list, Some("XX"), "/coverage-variants");
        assert_eq!(target.entity().map(|e| e.key.as_str()), Some("MI"));
    }

    #[test]
    fn test_adjacent_target_falls_back_to_summary() {
        let list = sample();

        let target = adjacent_target(&list, 0, -1, "/insured-summary");
        assert_eq!(target.destination(), "/insured-summary");
        assert_eq!(
            target.violation().map(|v| v.kind()),
            Some(ViolationKind::OutOfBoundsTraversal)
        );

        let target = adjacent_target(&list, 0, 1, "/insured-summary");
        assert_eq!(target.destination(), "nav-SP");
        assert!(target.violation().is_none());
    }

    #[test]
    fn test_progress_counts() {
        let p = progress(&sample());
        assert_eq!(p, TraversalProgress { complete: 2, total: 4 });
        assert_eq!(p.remaining(), 2);
        assert!(!p.is_finished());
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;
    use crate::insured::InsuredKind;

    fn arb_list() -> impl Strategy<Value = Vec<InsuredEntityRef>> {
        prop::collection::vec(any::<bool>(), 0..20).prop_map(|flags| {
            flags
                .into_iter()
                .enumerate()
                .map(|(i, complete)| {
                    InsuredEntityRef::new(format!("K{}", i), InsuredKind::Individual, complete, format!("n{}", i))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn next_incomplete_never_before_start(list in arb_list(), start in 0usize..25) {
            if let Some(found) = resolve_next_incomplete(&list, start) {
                let idx = resolve_current_index(&list, Some(&found.key)).unwrap();
                prop_assert!(idx >= start);
                prop_assert!(!found.is_complete);
                prop_assert!(list[start..idx].iter().all(|e| e.is_complete));
            } else {
                prop_assert!(list.iter().skip(start).all(|e| e.is_complete));
            }
        }

        #[test]
        fn adjacent_matches_index_arithmetic(list in arb_list(), index in 0usize..20, delta in -5isize..5) {
            let expected = (index as isize + delta) >= 0 && ((index as isize + delta) as usize) < list.len();
            prop_assert_eq!(resolve_adjacent(&list, index, delta).is_some(), expected);
        }
    }
}
