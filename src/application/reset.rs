//! Cooldown-based reset policy.
//!
//! A tripped form has cooled down once a whole window has passed since its
//! most recent submission. This is independent of the volume inside the
//! window: it re-enables a form as soon as traffic has stopped.

use crate::application::error::LimiterError;
use crate::application::hooks::Hooks;
use crate::application::ports::SubmissionStore;
use crate::domain::{config::LimiterConfig, resource::ResourceId};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ResetPolicy {
    store: Arc<dyn SubmissionStore>,
    hooks: Hooks,
}

impl ResetPolicy {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        Self::with_hooks(store, Hooks::new())
    }

    pub fn with_hooks(store: Arc<dyn SubmissionStore>, hooks: Hooks) -> Self {
        Self { store, hooks }
    }

    /// Whether `resource` should be re-enabled automatically at `now`.
    ///
    /// Always `false` when `auto_reset` is off or the form has no
    /// submissions. Otherwise `true` iff the time since the last submission
    /// is strictly greater than the window. Reset hooks may adjust the
    /// result in the latter case.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` if the last submission cannot be read.
    pub fn should_reset(
        &self,
        resource: &ResourceId,
        config: &LimiterConfig,
        now: SystemTime,
    ) -> Result<bool, LimiterError> {
        if !config.auto_reset {
            return Ok(false);
        }

        let Some(last) = self.store.most_recent(resource)? else {
            return Ok(false);
        };

        let elapsed = now
            .duration_since(last.created_at)
            .unwrap_or(Duration::ZERO);
        let mut should_reset = elapsed > config.window;
        self.hooks.adjust_should_reset(resource, &mut should_reset);

        debug!(
            resource_id = %resource,
            elapsed_secs = elapsed.as_secs(),
            window_secs = config.window.as_secs(),
            should_reset,
            "checked cooldown"
        );
        Ok(should_reset)
    }
}
