//! Builder wiring a [`SubmissionRateLimiter`] from its ports.
//!
//! The store, state persistence and configuration source are required.
//! The clock defaults to [`SystemClock`] and the notifier to a log-only
//! [`TracingNotifier`].

use crate::application::hooks::Hooks;
use crate::application::limiter::SubmissionRateLimiter;
use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, ConfigSource, Notifier, StatePersistence, SubmissionStore};
use crate::infrastructure::{clock::SystemClock, notifier::TracingNotifier};
use std::fmt;
use std::sync::Arc;

/// Error returned when the limiter builder is missing a required port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A required port was not supplied
    MissingPort(&'static str),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingPort(port) => write!(f, "missing required port: {}", port),
        }
    }
}

impl std::error::Error for BuildError {}

impl SubmissionRateLimiter {
    pub fn builder() -> SubmissionRateLimiterBuilder {
        SubmissionRateLimiterBuilder::new()
    }
}

/// Builder for constructing a [`SubmissionRateLimiter`].
#[derive(Default)]
pub struct SubmissionRateLimiterBuilder {
    store: Option<Arc<dyn SubmissionStore>>,
    persistence: Option<Arc<dyn StatePersistence>>,
    config: Option<Arc<dyn ConfigSource>>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn Clock>>,
    hooks: Hooks,
    metrics: Option<Metrics>,
}

impl SubmissionRateLimiterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the submission store (required).
    pub fn with_store(mut self, store: Arc<dyn SubmissionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the state persistence (required).
    pub fn with_persistence(mut self, persistence: Arc<dyn StatePersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Set the configuration source (required).
    pub fn with_config_source(mut self, config: Arc<dyn ConfigSource>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the notifier. Defaults to a log-only [`TracingNotifier`].
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set the clock. Defaults to [`SystemClock`].
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Share an existing metrics tracker.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the limiter.
    ///
    /// # Errors
    /// Returns `BuildError::MissingPort` if the store, persistence or
    /// configuration source was not supplied.
    pub fn build(self) -> Result<SubmissionRateLimiter, BuildError> {
        let store = self.store.ok_or(BuildError::MissingPort("submission store"))?;
        let persistence = self
            .persistence
            .ok_or(BuildError::MissingPort("state persistence"))?;
        let config = self
            .config
            .ok_or(BuildError::MissingPort("config source"))?;

        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));

        Ok(SubmissionRateLimiter::new(
            store,
            persistence,
            config,
            notifier,
            clock,
            self.hooks,
            self.metrics.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::LayeredConfigSource;
    use crate::infrastructure::memory::{InMemoryStatePersistence, InMemorySubmissionStore};

    #[test]
    fn test_builder_requires_ports() {
        let err = SubmissionRateLimiter::builder().build().unwrap_err();
        assert_eq!(err, BuildError::MissingPort("submission store"));

        let err = SubmissionRateLimiter::builder()
            .with_store(Arc::new(InMemorySubmissionStore::new()))
            .with_persistence(Arc::new(InMemoryStatePersistence::new()))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required port: config source");
    }

    #[test]
    fn test_builder_shares_metrics() {
        let metrics = Metrics::new();
        let limiter = SubmissionRateLimiter::builder()
            .with_store(Arc::new(InMemorySubmissionStore::new()))
            .with_persistence(Arc::new(InMemoryStatePersistence::new()))
            .with_config_source(Arc::new(LayeredConfigSource::new()))
            .with_metrics(metrics.clone())
            .build()
            .unwrap();

        assert!(!limiter.is_disabled(&"contact".into()).unwrap());
        assert_eq!(limiter.metrics().evaluations(), metrics.evaluations());
    }
}
