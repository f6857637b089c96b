//! Percentage allocation validation and loading

mod validator;
pub mod loader;

pub use validator::{
    validate, find_duplicates, check, AllocationCheck, AllocationEntry, AllocationVerdict, FULL_ALLOCATION,
};
pub use loader::{load_groups, load_groups_from_reader, AllocationGroup};
