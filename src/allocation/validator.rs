//! Percentage allocation validation
//!
//! Allocations for one group (premium split across coverage codes, coverage
//! split across variants) must total exactly 100 and name each key once.
//! Equality is exact on `f64`: entries that only approximately reach 100
//! are a mismatch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

use crate::verdict::Violation;

/// The total every allocation group must reach
pub const FULL_ALLOCATION: f64 = 100.0;

/// One percentage share within an allocation group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub id: String,
    pub allocation_percent: f64,
}

impl AllocationEntry {
    pub fn new(id: impl Into<String>, allocation_percent: f64) -> Self {
        Self {
            id: id.into(),
            allocation_percent,
        }
    }
}

/// Result of checking an allocation total
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AllocationVerdict {
    Ok,
    Mismatch { total: f64 },
}

impl AllocationVerdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, AllocationVerdict::Ok)
    }

    /// Sum of the validated entries
    pub fn total(&self) -> f64 {
        match *self {
            AllocationVerdict::Ok => FULL_ALLOCATION,
            AllocationVerdict::Mismatch { total } => total,
        }
    }

    /// Percentage still to allocate; negative when over-allocated
    pub fn delta(&self) -> f64 {
        FULL_ALLOCATION - self.total()
    }

    pub fn violation(&self) -> Option<Violation> {
        match *self {
            AllocationVerdict::Ok => None,
            AllocationVerdict::Mismatch { total } => Some(Violation::AllocationMismatch { total }),
        }
    }
}

/// Check that the entries sum to exactly 100
pub fn validate(entries: &[AllocationEntry]) -> AllocationVerdict {
    let total: f64 = entries.iter().map(|e| e.allocation_percent).sum();

    if total == FULL_ALLOCATION {
        AllocationVerdict::Ok
    } else {
        AllocationVerdict::Mismatch { total }
    }
}

/// Keys that appear more than once, each reported once in first-occurrence order
pub fn find_duplicates<T, K, F>(entries: &[T], key_of: F) -> Vec<K>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut seen: HashMap<K, bool> = HashMap::with_capacity(entries.len());
    let mut duplicates = Vec::new();

    for entry in entries {
        let key = key_of(entry);
        match seen.get_mut(&key) {
            Some(reported) => {
                if !*reported {
                    *reported = true;
                    duplicates.push(key);
                }
            }
            None => {
                seen.insert(key, false);
            }
        }
    }

    duplicates
}

/// Total verdict and duplicate keys of one allocation group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationCheck {
    pub verdict: AllocationVerdict,
    pub duplicates: Vec<String>,
}

impl AllocationCheck {
    pub fn of(entries: &[AllocationEntry]) -> Self {
        Self {
            verdict: validate(entries),
            duplicates: find_duplicates(entries, |e| e.id.clone()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.verdict.is_ok() && self.duplicates.is_empty()
    }

    /// Duplicate keys first, followed by a total mismatch if any
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations: Vec<Violation> = self
            .duplicates
            .iter()
            .map(|key| Violation::DuplicateAllocationKey { key: key.clone() })
            .collect();

        violations.extend(self.verdict.violation());
        violations
    }
}

/// Everything that would block saving this allocation group
pub fn check(entries: &[AllocationEntry]) -> Vec<Violation> {
    AllocationCheck::of(entries).violations()
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    /// Integer shares that sum to exactly 100, with distinct ids
    fn arb_full_allocation() -> impl Strategy<Value = Vec<AllocationEntry>> {
        prop::collection::vec(1u32..=100, 1..10).prop_map(|cuts| {
            let mut points: Vec<u32> = cuts.into_iter().filter(|&c| c < 100).collect();
            points.push(0);
            points.push(100);
            points.sort_unstable();
            points.dedup();
            points
                .windows(2)
                .enumerate()
                .map(|(i, w)| AllocationEntry::new(format!("E{}", i), (w[1] - w[0]) as f64))
                .collect()
        })
    }

    fn arb_entries() -> impl Strategy<Value = Vec<AllocationEntry>> {
        prop::collection::vec(("[A-D]", 0.0f64..100.0), 0..12).prop_map(|pairs| {
            pairs
                .into_iter()
                .map(|(id, pct)| AllocationEntry::new(id, pct))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn full_unique_allocation_passes(list in arb_full_allocation()) {
            prop_assert!(validate(&list).is_ok());
            prop_assert!(find_duplicates(&list, |e| e.id.clone()).is_empty());
            prop_assert!(check(&list).is_empty());
        }

        #[test]
        fn total_equals_sum(list in arb_entries()) {
            let sum: f64 = list.iter().map(|e| e.allocation_percent).sum();
            prop_assert_eq!(validate(&list).total(), sum);
        }

        #[test]
        fn duplicates_are_unique_and_repeat(list in arb_entries()) {
            let dups = find_duplicates(&list, |e| e.id.clone());
            prop_assert!(find_duplicates(&dups, |k| k.clone()).is_empty());
            for key in &dups {
                prop_assert!(list.iter().filter(|e| &e.id == key).count() > 1);
            }
        }
    }
}
