//! Outcome of a rate limit evaluation.

use std::time::SystemTime;

/// A state change the caller must persist.
///
/// Evaluation only ever trips a form; resets come from the reset policy
/// or an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The form crossed its threshold and must be disabled
    Tripped { at: SystemTime },
}

/// Result of evaluating one form against its rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the form is (or just became) tripped
    pub tripped: bool,
    /// Submissions counted inside the trailing window
    pub volume: u64,
    /// State change produced by this evaluation, if any
    pub transition: Option<Transition>,
}

impl Decision {
    /// Decision for a form whose limiting is inert.
    pub fn inert() -> Self {
        Self {
            tripped: false,
            volume: 0,
            transition: None,
        }
    }

    /// Whether this evaluation tripped the form.
    pub fn is_new_trip(&self) -> bool {
        matches!(self.transition, Some(Transition::Tripped { .. }))
    }
}
