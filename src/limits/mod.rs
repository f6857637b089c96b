//! Limit representations and aggregate limit checks for coverage variant levels

mod spec;
mod resolver;
pub mod loader;

pub use spec::{LimitMode, LimitValue, LimitSpec, RawLimitSpec};
pub use resolver::{
    is_percentage_mode, is_amount_mode, effective_value, effective_aggregate,
    validate_against_parent, validate_hierarchy, AggregateVerdict, LimitLevel,
};
pub use loader::{load_levels, load_levels_from_reader};
