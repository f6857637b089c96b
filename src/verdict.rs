//! Violations reported by the validators, the step tracker and the traversal resolver
//!
//! Every violation is returned as a value to the immediate caller. Nothing here
//! is logged or retried; the caller decides how to surface it (error toast,
//! blocked save, redirect to a summary screen).

use serde::Serialize;
use std::fmt;

use crate::limits::LimitMode;

/// Discriminant of a [`Violation`], for callers that map kinds to messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    AllocationMismatch,
    DuplicateAllocationKey,
    AggregateExceeded,
    AggregateModeMismatch,
    UnknownParentLevel,
    DuplicateLevelKey,
    BlockedTransition,
    OutOfBoundsTraversal,
}

/// A single reason a save or a navigation was refused
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Violation {
    /// Allocation percentages do not total exactly 100
    AllocationMismatch { total: f64 },

    /// The same allocation key appears more than once
    DuplicateAllocationKey { key: String },

    /// Child aggregate limit is above the parent's cumulative limit
    AggregateExceeded {
        level: Option<String>,
        child: f64,
        parent: f64,
    },

    /// Child and parent aggregates are expressed in different modes and
    /// cannot be compared
    AggregateModeMismatch {
        level: Option<String>,
        child_mode: LimitMode,
        parent_mode: LimitMode,
    },

    /// A level names a parent level that is not present
    UnknownParentLevel { level: String, parent: String },

    /// Two levels share the same key
    DuplicateLevelKey { level: String },

    /// The entry guard refused the next wizard position
    BlockedTransition { step: usize, sub_step: usize },

    /// Adjacent insured entity lookup ran off either end of the list
    OutOfBoundsTraversal { index: usize, delta: isize },
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        match self {
            Violation::AllocationMismatch { .. } => ViolationKind::AllocationMismatch,
            Violation::DuplicateAllocationKey { .. } => ViolationKind::DuplicateAllocationKey,
            Violation::AggregateExceeded { .. } => ViolationKind::AggregateExceeded,
            Violation::AggregateModeMismatch { .. } => ViolationKind::AggregateModeMismatch,
            Violation::UnknownParentLevel { .. } => ViolationKind::UnknownParentLevel,
            Violation::DuplicateLevelKey { .. } => ViolationKind::DuplicateLevelKey,
            Violation::BlockedTransition { .. } => ViolationKind::BlockedTransition,
            Violation::OutOfBoundsTraversal { .. } => ViolationKind::OutOfBoundsTraversal,
        }
    }

    /// Whether this violation must stop a pending save
    ///
    /// Navigation violations only redirect the user and never block a save.
    pub fn blocks_save(&self) -> bool {
        !matches!(
            self,
            Violation::BlockedTransition { .. } | Violation::OutOfBoundsTraversal { .. }
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::AllocationMismatch { total } => write!(
                f,
                "allocations total {}%, expected exactly 100% ({:+} remaining)",
                total,
                100.0 - total
            ),
            Violation::DuplicateAllocationKey { key } => {
                write!(f, "allocation '{}' is listed more than once", key)
            }
            Violation::AggregateExceeded { level, child, parent } => match level {
                Some(level) => write!(
                    f,
                    "aggregate limit {} on level '{}' exceeds the cumulative limit {}",
                    child, level, parent
                ),
                None => write!(
                    f,
                    "aggregate limit {} exceeds the cumulative limit {}",
                    child, parent
                ),
            },
            Violation::AggregateModeMismatch { level, child_mode, parent_mode } => {
                let level = level.as_deref().unwrap_or("child");
                write!(
                    f,
                    "aggregate limit on '{}' is in {} mode but its parent is in {} mode; they cannot be compared",
                    level, child_mode, parent_mode
                )
            }
            Violation::UnknownParentLevel { level, parent } => {
                write!(f, "level '{}' refers to missing parent '{}'", level, parent)
            }
            Violation::DuplicateLevelKey { level } => {
                write!(f, "level '{}' is defined more than once", level)
            }
            Violation::BlockedTransition { step, sub_step } => {
                write!(f, "wizard position ({}, {}) is not available", step, sub_step)
            }
            Violation::OutOfBoundsTraversal { index, delta } => {
                write!(f, "no insured entity at {} {:+}", index, delta)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceeded_message_is_distinct() {
        let exceeded = Violation::AggregateExceeded {
            level: Some("MI".to_string()),
            child: 1500.0,
            parent: 1000.0,
        };
        let mismatch = Violation::AllocationMismatch { total: 90.0 };

        assert!(exceeded.to_string().contains("exceeds the cumulative limit"));
        assert!(!mismatch.to_string().contains("cumulative"));
        assert_ne!(exceeded.kind(), mismatch.kind());
    }

    #[test]
    fn test_mismatch_message_reports_delta() {
        let v = Violation::AllocationMismatch { total: 90.0 };
        assert_eq!(
            v.to_string(),
            "allocations total 90%, expected exactly 100% (+10 remaining)"
        );
    }

    #[test]
    fn test_navigation_violations_do_not_block_save() {
        assert!(!Violation::BlockedTransition { step: 1, sub_step: 0 }.blocks_save());
        assert!(!Violation::OutOfBoundsTraversal { index: 0, delta: -1 }.blocks_save());
        assert!(Violation::DuplicateAllocationKey { key: "A".into() }.blocks_save());
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let v = Violation::DuplicateAllocationKey { key: "A".to_string() };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "DuplicateAllocationKey");
        assert_eq!(json["key"], "A");
    }
}
