//! Aggregate limit resolution and parent/child consistency checks

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{LimitMode, LimitSpec, LimitValue};
use crate::verdict::Violation;

pub fn is_percentage_mode(spec: &LimitSpec) -> bool {
    spec.mode() == LimitMode::Percentage
}

pub fn is_amount_mode(spec: &LimitSpec) -> bool {
    spec.mode() == LimitMode::Amount
}

/// Per-claim limit in whichever mode the spec declares
pub fn effective_value(spec: &LimitSpec) -> f64 {
    match spec.limit {
        LimitValue::Amount(amount) => amount,
        LimitValue::Percentage(percent_of) => percent_of,
    }
}

/// Aggregate limit in whichever mode the spec declares
pub fn effective_aggregate(spec: &LimitSpec) -> f64 {
    match spec.aggregate {
        LimitValue::Amount(amount) => amount,
        LimitValue::Percentage(percent) => percent,
    }
}

/// Outcome of checking a child level's aggregate against its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateVerdict {
    Ok,

    /// Child aggregate is above the parent's cumulative limit
    Exceeded { child: f64, parent: f64 },

    /// Aggregates are in different modes; no conversion rule is defined
    ModeMismatch {
        child_mode: LimitMode,
        parent_mode: LimitMode,
    },
}

impl AggregateVerdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, AggregateVerdict::Ok)
    }

    pub fn is_exceeded(&self) -> bool {
        matches!(self, AggregateVerdict::Exceeded { .. })
    }

    /// Convert a failed verdict into a violation attributed to `level`
    pub fn violation(&self, level: Option<&str>) -> Option<Violation> {
        let level = level.map(str::to_string);
        match *self {
            AggregateVerdict::Ok => None,
            AggregateVerdict::Exceeded { child, parent } => {
                Some(Violation::AggregateExceeded { level, child, parent })
            }
            AggregateVerdict::ModeMismatch { child_mode, parent_mode } => {
                Some(Violation::AggregateModeMismatch {
                    level,
                    child_mode,
                    parent_mode,
                })
            }
        }
    }
}

/// Check that a child's aggregate limit fits inside its parent's
///
/// A missing parent, or a parent aggregate of zero or less, means no
/// constraint is configured. Aggregates in different modes are reported
/// as [`AggregateVerdict::ModeMismatch`] rather than compared.
pub fn validate_against_parent(child: &LimitSpec, parent: Option<&LimitSpec>) -> AggregateVerdict {
    let Some(parent) = parent else {
        return AggregateVerdict::Ok;
    };

    let parent_aggregate = effective_aggregate(parent);
    if parent_aggregate <= 0.0 {
        return AggregateVerdict::Ok;
    }

    if child.aggregate_mode() != parent.aggregate_mode() {
        return AggregateVerdict::ModeMismatch {
            child_mode: child.aggregate_mode(),
            parent_mode: parent.aggregate_mode(),
        };
    }

    let child_aggregate = effective_aggregate(child);
    if child_aggregate <= parent_aggregate {
        AggregateVerdict::Ok
    } else {
        AggregateVerdict::Exceeded {
            child: child_aggregate,
            parent: parent_aggregate,
        }
    }
}

/// One level in a nested limit definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitLevel {
    /// Level identifier, unique within a hierarchy
    pub key: String,

    /// Key of the enclosing level, if any
    #[serde(default)]
    pub parent_key: Option<String>,

    #[serde(flatten)]
    pub spec: LimitSpec,
}

impl LimitLevel {
    pub fn root(key: impl Into<String>, spec: LimitSpec) -> Self {
        Self {
            key: key.into(),
            parent_key: None,
            spec,
        }
    }

    pub fn child(key: impl Into<String>, parent_key: impl Into<String>, spec: LimitSpec) -> Self {
        Self {
            key: key.into(),
            parent_key: Some(parent_key.into()),
            spec,
        }
    }
}

/// Validate every level of a hierarchy against its parent
///
/// Violations are reported in level order. Duplicate keys are reported once
/// each; the first definition of a key is the one children resolve to.
pub fn validate_hierarchy(levels: &[LimitLevel]) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut by_key: HashMap<&str, &LimitLevel> = HashMap::with_capacity(levels.len());
    let mut reported = HashSet::new();

    for level in levels {
        if by_key.contains_key(level.key.as_str()) {
            if reported.insert(level.key.as_str()) {
                violations.push(Violation::DuplicateLevelKey {
                    level: level.key.clone(),
                });
            }
        } else {
            by_key.insert(level.key.as_str(), level);
        }
    }

    for level in levels {
        let Some(parent_key) = level.parent_key.as_deref() else {
            continue;
        };

        match by_key.get(parent_key) {
            Some(parent) => {
                let verdict = validate_against_parent(&level.spec, Some(&parent.spec));
                if let Some(v) = verdict.violation(Some(&level.key)) {
                    violations.push(v);
                }
            }
            None => violations.push(Violation::UnknownParentLevel {
                level: level.key.clone(),
                parent: parent_key.to_string(),
            }),
        }
    }

    violations
}
