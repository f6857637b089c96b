//! Coverage Workflow - workflow and invariant engine for insurance product configuration
//!
//! This library provides:
//! - A table-driven step/sub-step wizard tracker with guarded transitions
//! - Traversal over insured individuals, objects and events
//! - Allocation validation (exact 100% totals, duplicate keys)
//! - Aggregate limit resolution across nested coverage variant levels
//!
//! Everything is synchronous and performs no I/O beyond the explicit loaders.

pub mod error;
pub mod verdict;
pub mod session;
pub mod wizard;
pub mod insured;
pub mod allocation;
pub mod limits;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use verdict::{Violation, ViolationKind};
pub use session::{SessionContext, ProductStatus};
pub use wizard::{StepTracker, WizardConfig, WizardPosition, Transition, EntryGuard};
pub use insured::{InsuredEntityRef, InsuredKind, InsuredSnapshot, TraversalTarget};
pub use allocation::{AllocationEntry, AllocationVerdict};
pub use limits::{LimitSpec, LimitValue, LimitMode, LimitLevel, AggregateVerdict};
