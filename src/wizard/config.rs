//! Wizard step table and entry rules
//!
//! The table is loaded once per session from JSON:
//!
//! ```json
//! {
//!   "steps": [
//!     { "label": "Product Details", "routeTemplate": "/products/{productId}/details" },
//!     { "label": "Availability", "routeTemplate": "/products/{productId}/availability",
//!       "subSteps": [
//!         { "label": "Countries", "routeTemplate": "/products/{productId}/availability" },
//!         { "label": "US States", "routeTemplate": "/products/{productId}/availability/states" }
//!       ] }
//!   ],
//!   "rules": [
//!     { "step": "Availability", "subStep": "US States", "effect": "skip",
//!       "condition": { "when": "countryIs", "country": "US" } }
//!   ]
//! }
//! ```
//!
//! Rules name steps by label; labels are resolved to indices once, when the
//! rules are compiled, so transitions never compare strings.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{EngineError, Result};
use crate::insured::InsuredKind;
use crate::session::{ProductStatus, SessionContext};

/// Default path to the sample wizard configuration
pub const DEFAULT_WIZARD_PATH: &str = "data/wizard.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSubStep {
    pub label: String,
    pub route_template: String,
}

/// One top-level wizard step
///
/// A step without sub-steps is a single position routed by its own template.
/// A step with sub-steps has one position per sub-step, each routed by the
/// sub-step's template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStep {
    pub label: String,
    pub route_template: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_steps: Vec<WizardSubStep>,
}

impl WizardStep {
    /// Number of addressable sub-step positions (at least one)
    pub fn position_count(&self) -> usize {
        self.sub_steps.len().max(1)
    }
}

/// Predicate over the session deciding whether a rule's position is available
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "camelCase")]
pub enum EntryCondition {
    CountryIs { country: String },
    CountryIsNot { country: String },
    HasInsuredKind { kind: InsuredKind },
    ProductStatusIs { status: ProductStatus },
}

impl EntryCondition {
    pub fn holds(&self, session: &SessionContext) -> bool {
        match self {
            EntryCondition::CountryIs { country } => session.is_country(country),
            EntryCondition::CountryIsNot { country } => !session.is_country(country),
            EntryCondition::HasInsuredKind { kind } => session.has_insured_kind(*kind),
            EntryCondition::ProductStatusIs { status } => session.product_status == *status,
        }
    }
}

/// What happens when a rule's condition does not hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleEffect {
    /// The guard refuses entry; the transition is reported as blocked
    #[default]
    Block,

    /// The position is left out of forward and backward traversal
    Skip,
}

/// Entry rule as written in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRule {
    pub step: String,

    /// Applies to every sub-step of `step` when absent
    #[serde(default)]
    pub sub_step: Option<String>,

    #[serde(default)]
    pub effect: RuleEffect,

    pub condition: EntryCondition,
}

/// Entry rule with labels resolved to table indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    pub step: usize,
    pub sub_step: Option<usize>,
    pub effect: RuleEffect,
    pub condition: EntryCondition,
}

impl CompiledRule {
    pub fn applies_to(&self, step: usize, sub_step: usize) -> bool {
        self.step == step && self.sub_step.map_or(true, |s| s == sub_step)
    }
}

/// Ordered step table plus entry rules; immutable once loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    pub steps: Vec<WizardStep>,
    #[serde(default)]
    pub rules: Vec<EntryRule>,
}

impl WizardConfig {
    /// Build a config, rejecting an empty table and unresolvable rule labels
    pub fn new(steps: Vec<WizardStep>, rules: Vec<EntryRule>) -> Result<Self> {
        let config = Self { steps, rules };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config = Self::from_reader(BufReader::new(File::open(path)?))?;
        debug!(
            "loaded wizard config from {} ({} steps, {} rules)",
            path.display(),
            config.steps.len(),
            config.rules.len()
        );
        Ok(config)
    }

    /// Load and validate a configuration from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(EngineError::EmptyWizard);
        }
        self.compile_rules()?;
        Ok(())
    }

    /// Whether `(step, sub_step)` addresses a configured position
    pub fn contains(&self, step: usize, sub_step: usize) -> bool {
        self.steps
            .get(step)
            .is_some_and(|s| sub_step < s.position_count())
    }

    /// Route template of a position
    pub fn template_at(&self, step: usize, sub_step: usize) -> Option<&str> {
        let s = self.steps.get(step)?;
        if s.sub_steps.is_empty() {
            (sub_step == 0).then_some(s.route_template.as_str())
        } else {
            s.sub_steps.get(sub_step).map(|sub| sub.route_template.as_str())
        }
    }

    /// Label of a position; sub-step label when the step has sub-steps
    pub fn label_at(&self, step: usize, sub_step: usize) -> Option<&str> {
        let s = self.steps.get(step)?;
        if s.sub_steps.is_empty() {
            (sub_step == 0).then_some(s.label.as_str())
        } else {
            s.sub_steps.get(sub_step).map(|sub| sub.label.as_str())
        }
    }

    /// The position after `(step, sub_step)` in table order
    pub fn next_position(&self, step: usize, sub_step: usize) -> Option<(usize, usize)> {
        let current = self.steps.get(step)?;
        if sub_step + 1 < current.position_count() {
            Some((step, sub_step + 1))
        } else if step + 1 < self.steps.len() {
            Some((step + 1, 0))
        } else {
            None
        }
    }

    /// The position before `(step, sub_step)` in table order
    pub fn prev_position(&self, step: usize, sub_step: usize) -> Option<(usize, usize)> {
        if sub_step > 0 {
            Some((step, sub_step - 1))
        } else if step > 0 {
            let prev = self.steps.get(step - 1)?;
            Some((step - 1, prev.position_count() - 1))
        } else {
            None
        }
    }

    /// Resolve a step label (and optional sub-step label) to indices
    pub fn position_of(&self, step_label: &str, sub_label: Option<&str>) -> Result<(usize, Option<usize>)> {
        let step = self
            .steps
            .iter()
            .position(|s| s.label == step_label)
            .ok_or_else(|| EngineError::UnknownLabel(step_label.to_string()))?;

        let sub_step = match sub_label {
            Some(label) => Some(
                self.steps[step]
                    .sub_steps
                    .iter()
                    .position(|s| s.label == label)
                    .ok_or_else(|| EngineError::UnknownLabel(format!("{} / {}", step_label, label)))?,
            ),
            None => None,
        };

        Ok((step, sub_step))
    }

    /// Resolve every rule's labels to indices
    pub fn compile_rules(&self) -> Result<Vec<CompiledRule>> {
        self.rules
            .iter()
            .map(|rule| {
                let (step, sub_step) = self.position_of(&rule.step, rule.sub_step.as_deref())?;
                Ok(CompiledRule {
                    step,
                    sub_step,
                    effect: rule.effect,
                    condition: rule.condition.clone(),
                })
            })
            .collect()
    }

    /// Total number of addressable positions
    pub fn position_count(&self) -> usize {
        self.steps.iter().map(WizardStep::position_count).sum()
    }
}

/// Substitute `{name}` placeholders from the session context
pub fn render_template(template: &str, session: &SessionContext) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| EngineError::MalformedTemplate(template.to_string()))?;
        let name = &after[..close];

        let value = session
            .placeholder(name)
            .ok_or_else(|| EngineError::UnknownPlaceholder {
                template: template.to_string(),
                name: name.to_string(),
            })?;
        out.push_str(&value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}
