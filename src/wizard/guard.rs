//! Entry guards consulted before each forward wizard transition
//!
//! The configuration's own block and skip rules are evaluated by the tracker
//! against its session. A guard adds caller-side checks on top of them, such
//! as a lookup that may fail.

use std::convert::Infallible;

/// Decides whether a wizard position may be entered
///
/// Errors are returned to the caller of [`StepTracker::advance`](super::StepTracker::advance)
/// unchanged. Any `FnMut(usize, usize) -> Result<bool, E>` closure is a guard.
pub trait EntryGuard {
    type Error;

    fn can_enter(&mut self, step: usize, sub_step: usize) -> std::result::Result<bool, Self::Error>;
}

impl<F, E> EntryGuard for F
where
    F: FnMut(usize, usize) -> std::result::Result<bool, E>,
{
    type Error = E;

    fn can_enter(&mut self, step: usize, sub_step: usize) -> std::result::Result<bool, E> {
        self(step, sub_step)
    }
}

/// Guard that admits every position
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGuard;

impl EntryGuard for OpenGuard {
    type Error = Infallible;

    fn can_enter(&mut self, _step: usize, _sub_step: usize) -> std::result::Result<bool, Infallible> {
        Ok(true)
    }
}
