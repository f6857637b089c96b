//! Insured entities (individuals, insured objects, insured events) and their traversal

mod entity;
mod resolver;

pub use entity::{InsuredKind, InsuredEntityRef, RawInsuredEntity, InsuredSnapshot};
pub use resolver::{
    resolve_current_index, resolve_next_incomplete, resolve_adjacent, next_target,
    adjacent_target, progress, TraversalTarget, TraversalProgress,
};
