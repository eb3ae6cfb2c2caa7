//! Rate limit evaluation.
//!
//! The evaluator counts submissions inside the trailing window and decides
//! whether a form trips. Once tripped, a form stays tripped until it is
//! reset: the evaluator never clears a trip because volume dropped.

use crate::application::error::LimiterError;
use crate::application::hooks::Hooks;
use crate::application::ports::SubmissionStore;
use crate::domain::{
    config::LimiterConfig,
    decision::{Decision, Transition},
    resource::ResourceId,
    state::LimiterState,
};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Decides whether a form has exceeded its submission rate limit.
#[derive(Debug, Clone)]
pub struct Evaluator {
    store: Arc<dyn SubmissionStore>,
    hooks: Hooks,
}

impl Evaluator {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self::with_hooks(store, Hooks::new())
    }

    pub fn with_hooks(store: Arc<dyn SubmissionStore>, hooks: Hooks) -> Self {
        Self { store, hooks }
    }

    /// Evaluate `resource` at `now`.
    ///
    /// # Behavior
    /// - Inert config: returns [`Decision::inert`] without querying the store.
    /// - Already tripped (`tripped_at <= now`): stays tripped, no transition.
    /// - `volume > threshold`: trips with `Transition::Tripped { at: now }`.
    ///   Equal volume does not trip.
    /// - Trip stored for a later instant: not tripped yet, no transition,
    ///   matching what the limiter reports for the form.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` if the submission count cannot be read.
    pub fn evaluate(
        &self,
        resource: &ResourceId,
        config: &LimiterConfig,
        state: &LimiterState,
        now: SystemTime,
    ) -> Result<Decision, LimiterError> {
        if !config.is_active() {
            return Ok(Decision::inert());
        }

        let volume = self.volume(resource, config, now)?;

        if self.is_tripped(resource, state, now) {
            debug!(
                resource_id = %resource,
                volume,
                "form already tripped, skipping threshold check"
            );
            return Ok(Decision {
                tripped: true,
                volume,
                transition: None,
            });
        }

        // A future-dated trip is left in place rather than moved earlier,
        // and the form is not reported tripped before that instant.
        if volume > config.threshold && state.tripped_at.is_none() {
            debug!(
                resource_id = %resource,
                volume,
                threshold = config.threshold,
                "submission volume exceeded threshold"
            );
            return Ok(Decision {
                tripped: true,
                volume,
                transition: Some(Transition::Tripped { at: now }),
            });
        }

        Ok(Decision {
            tripped: false,
            volume,
            transition: None,
        })
    }

    /// Submissions counted for `resource` in the window ending at `now`,
    /// after volume hooks have run.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` if the store query fails.
    pub fn volume(
        &self,
        resource: &ResourceId,
        config: &LimiterConfig,
        now: SystemTime,
    ) -> Result<u64, LimiterError> {
        let window_start = now
            .checked_sub(config.window)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut volume = self.store.count_since(resource, window_start)?;
        self.hooks.adjust_volume(resource, &mut volume);
        Ok(volume)
    }

    /// Whether `state` counts as tripped at `now`, after trip hooks have run.
    pub fn is_tripped(&self, resource: &ResourceId, state: &LimiterState, now: SystemTime) -> bool {
        let mut tripped = state.is_tripped_at(now);
        self.hooks.adjust_tripped(resource, &mut tripped);
        tripped
    }
}
