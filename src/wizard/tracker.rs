//! Step/sub-step position tracking for the configuration wizard
//!
//! States are `(step, sub_step)` pairs addressing the configured table. The
//! tracker starts at `(0, 0)` and has no terminal state. Forward moves consult
//! the configuration's blocking rules and then the entry guard, one position
//! at a time; backward moves and jumps do neither. Positions excluded by
//! `skip` rules are stepped over on the way forward. Rules are evaluated
//! against the tracker's session on every move.
//!
//! Backward moves retrace the positions the tracker actually entered, so a
//! visited position is always re-enterable even if a rule would skip it
//! today. With nothing left to retrace (at the start, or right after a jump)
//! `retreat` walks the table backward instead.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::config::{render_template, CompiledRule, RuleEffect, WizardConfig};
use super::guard::{EntryGuard, OpenGuard};
use crate::error::{EngineError, Result};
use crate::session::SessionContext;
use crate::verdict::Violation;

/// Current wizard position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardPosition {
    pub step: usize,
    pub sub_step: usize,

    /// One-shot route that replaces the templated route on the next read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_route_override: Option<String>,
}

impl WizardPosition {
    pub fn coordinates(&self) -> (usize, usize) {
        (self.step, self.sub_step)
    }
}

/// Outcome of an `advance` or `retreat` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// All requested moves were applied
    Completed { moved: usize },

    /// The guard refused `(step, sub_step)`; earlier moves were kept
    Blocked {
        moved: usize,
        step: usize,
        sub_step: usize,
    },

    /// Ran out of positions in the direction of travel
    AtBoundary { moved: usize },
}

impl Transition {
    /// Number of single moves actually applied
    pub fn moved(&self) -> usize {
        match *self {
            Transition::Completed { moved }
            | Transition::Blocked { moved, .. }
            | Transition::AtBoundary { moved } => moved,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Transition::Blocked { .. })
    }

    pub fn violation(&self) -> Option<Violation> {
        match *self {
            Transition::Blocked { step, sub_step, .. } => {
                Some(Violation::BlockedTransition { step, sub_step })
            }
            _ => None,
        }
    }
}

/// Wizard controller owning the position and session for one product
#[derive(Debug)]
pub struct StepTracker<G = OpenGuard> {
    config: WizardConfig,
    rules: Vec<CompiledRule>,
    session: SessionContext,
    guard: G,

    /// Positions left by forward moves, most recent last
    trail: Vec<(usize, usize)>,

    position: WizardPosition,
}

impl StepTracker<OpenGuard> {
    /// Tracker governed only by the configuration's own rules
    pub fn for_session(config: WizardConfig, session: SessionContext) -> Result<Self> {
        Self::new(config, session, OpenGuard)
    }
}

impl<G: EntryGuard> StepTracker<G> {
    pub fn new(config: WizardConfig, session: SessionContext, guard: G) -> Result<Self> {
        let rules = config.compile_rules()?;

        debug!(
            "wizard session for product {} starts with {} positions and {} rules",
            session.product_id,
            config.position_count(),
            rules.len()
        );

        Ok(Self {
            config,
            rules,
            session,
            guard,
            trail: Vec::new(),
            position: WizardPosition::default(),
        })
    }

    pub fn position(&self) -> &WizardPosition {
        &self.position
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Session updates apply to the next move and the next route read
    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }

    pub fn guard_mut(&mut self) -> &mut G {
        &mut self.guard
    }

    pub fn current_label(&self) -> Option<&str> {
        self.config.label_at(self.position.step, self.position.sub_step)
    }

    fn failing_rule(&self, effect: RuleEffect, step: usize, sub_step: usize) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| {
            r.effect == effect && r.applies_to(step, sub_step) && !r.condition.holds(&self.session)
        })
    }

    /// Whether forward moves currently step over the position
    pub fn is_skipped(&self, step: usize, sub_step: usize) -> bool {
        self.failing_rule(RuleEffect::Skip, step, sub_step).is_some()
    }

    /// First blocking rule that refuses the position, so the caller can explain why
    pub fn refusing_rule(&self, step: usize, sub_step: usize) -> Option<&CompiledRule> {
        self.failing_rule(RuleEffect::Block, step, sub_step)
    }

    fn next_candidate(&self, (mut step, mut sub_step): (usize, usize)) -> Option<(usize, usize)> {
        loop {
            (step, sub_step) = self.config.next_position(step, sub_step)?;
            if !self.is_skipped(step, sub_step) {
                return Some((step, sub_step));
            }
        }
    }

    fn prev_candidate(&self, (mut step, mut sub_step): (usize, usize)) -> Option<(usize, usize)> {
        loop {
            (step, sub_step) = self.config.prev_position(step, sub_step)?;
            if !self.is_skipped(step, sub_step) {
                return Some((step, sub_step));
            }
        }
    }

    fn move_to(&mut self, step: usize, sub_step: usize) {
        trace!(
            "wizard position ({}, {}) -> ({}, {})",
            self.position.step,
            self.position.sub_step,
            step,
            sub_step
        );
        self.position.step = step;
        self.position.sub_step = sub_step;
    }

    /// Apply up to `count` forward moves, checking rules and guard before each one
    ///
    /// A refused move stops the sequence and leaves the position where the
    /// last accepted move put it. A guard error does the same and is returned
    /// as-is.
    pub fn advance(&mut self, count: usize) -> std::result::Result<Transition, G::Error> {
        let mut moved = 0;

        while moved < count {
            let Some((step, sub_step)) = self.next_candidate(self.position.coordinates()) else {
                return Ok(Transition::AtBoundary { moved });
            };

            let refused = self.refusing_rule(step, sub_step).is_some()
                || !self.guard.can_enter(step, sub_step)?;
            if refused {
                debug!("wizard position ({}, {}) refused", step, sub_step);
                return Ok(Transition::Blocked {
                    moved,
                    step,
                    sub_step,
                });
            }

            self.trail.push(self.position.coordinates());
            self.move_to(step, sub_step);
            moved += 1;
        }

        Ok(Transition::Completed { moved })
    }

    /// Apply up to `count` backward moves; visited positions are always re-enterable
    pub fn retreat(&mut self, count: usize) -> Transition {
        let mut moved = 0;

        while moved < count {
            let target = match self.trail.pop() {
                Some(previous) => previous,
                None => match self.prev_candidate(self.position.coordinates()) {
                    Some(previous) => previous,
                    None => return Transition::AtBoundary { moved },
                },
            };
            self.move_to(target.0, target.1);
            moved += 1;
        }

        Transition::Completed { moved }
    }

    /// Move straight to a configured position without consulting rules or guard
    ///
    /// The jump starts a fresh trail; a later `retreat` walks the table
    /// backward from the target.
    pub fn jump_to(&mut self, step: usize, sub_step: usize) -> Result<()> {
        if !self.config.contains(step, sub_step) {
            return Err(EngineError::PositionOutOfRange { step, sub_step });
        }
        self.trail.clear();
        self.move_to(step, sub_step);
        Ok(())
    }

    /// Route returned by the next `current_route` call instead of the template
    pub fn set_route_override(&mut self, route: impl Into<String>) {
        self.position.pending_route_override = Some(route.into());
    }

    /// Templated route of the current position, ignoring any override
    pub fn templated_route(&self) -> Result<String> {
        let (step, sub_step) = self.position.coordinates();
        let template = self
            .config
            .template_at(step, sub_step)
            .ok_or(EngineError::PositionOutOfRange { step, sub_step })?;
        render_template(template, &self.session)
    }

    /// Route to navigate to now; a pending override wins and is consumed
    pub fn current_route(&mut self) -> Result<String> {
        match self.position.pending_route_override.take() {
            Some(route) => Ok(route),
            None => self.templated_route(),
        }
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;
    use crate::wizard::config::{EntryCondition, EntryRule, WizardStep, WizardSubStep};

    /// Tracker over a random table where each position may carry a skip rule
    /// that fails for the session, plus every configured position
    fn arb_tracker() -> impl Strategy<Value = (StepTracker, Vec<(usize, usize)>)> {
        prop::collection::vec((0usize..4, any::<u8>()), 1..6).prop_map(|shape| {
            let mut steps = Vec::new();
            let mut rules = Vec::new();
            let mut positions = Vec::new();

            for (i, &(subs, skip_mask)) in shape.iter().enumerate() {
                let label = format!("S{}", i);
                let sub_labels: Vec<String> = (0..subs).map(|j| format!("S{}.{}", i, j)).collect();

                for j in 0..subs.max(1) {
                    positions.push((i, j));
                    if skip_mask & (1 << j) != 0 {
                        rules.push(EntryRule {
                            step: label.clone(),
                            sub_step: sub_labels.get(j).cloned(),
                            effect: RuleEffect::Skip,
                            condition: EntryCondition::CountryIs { country: "XX".into() },
                        });
                    }
                }

                steps.push(WizardStep {
                    label,
                    route_template: format!("/s{}", i),
                    sub_steps: sub_labels
                        .into_iter()
                        .enumerate()
                        .map(|(j, label)| WizardSubStep {
                            label,
                            route_template: format!("/s{}/{}", i, j),
                        })
                        .collect(),
                });
            }

            let config = WizardConfig::new(steps, rules).unwrap();
            let tracker = StepTracker::for_session(config, SessionContext::new("P", "US")).unwrap();
            (tracker, positions)
        })
    }

    proptest! {
        #[test]
        fn advance_then_retreat_returns_to_start(
            (tracker, positions) in arb_tracker(),
            start in any::<prop::sample::Index>(),
            n in 0usize..20,
        ) {
            let mut tracker = tracker;
            let (step, sub_step) = *start.get(&positions);
            tracker.jump_to(step, sub_step).unwrap();
            let before = tracker.templated_route().unwrap();

            let forward = tracker.advance(n).unwrap();
            prop_assert!(!forward.is_blocked());
            prop_assert_eq!(tracker.retreat(forward.moved()), Transition::Completed { moved: forward.moved() });
            prop_assert_eq!(tracker.templated_route().unwrap(), before);
        }

        #[test]
        fn forward_moves_never_land_on_skipped_positions((tracker, _positions) in arb_tracker(), n in 0usize..20) {
            let mut tracker = tracker;
            let moved = tracker.advance(n).unwrap().moved();
            if moved > 0 {
                let (step, sub_step) = tracker.position().coordinates();
                prop_assert!(!tracker.is_skipped(step, sub_step));
            }
        }
    }
}
