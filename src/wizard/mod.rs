//! Multi-step product configuration wizard: step table, entry guards and position tracking

mod config;
mod guard;
mod tracker;

pub use config::{
    render_template, WizardConfig, WizardStep, WizardSubStep, EntryRule, EntryCondition,
    RuleEffect, CompiledRule, DEFAULT_WIZARD_PATH,
};
pub use guard::{EntryGuard, OpenGuard};
pub use tracker::{StepTracker, WizardPosition, Transition};
