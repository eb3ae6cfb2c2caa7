//! Rate limiter coordination logic.
//!
//! [`SubmissionRateLimiter`] wires the evaluator, reset policy and
//! notification dispatch to the host's ports and exposes the operations the
//! host calls from its request lifecycle:
//! - after a submission is processed: [`SubmissionRateLimiter::record_submission`]
//! - before a form page is rendered: [`SubmissionRateLimiter::on_page_view`]
//! - while building the form: [`SubmissionRateLimiter::gate_form`]
//! - from an admin screen: [`SubmissionRateLimiter::status`] and
//!   [`SubmissionRateLimiter::reset`]

use crate::application::dispatch::NotificationDispatch;
use crate::application::error::LimiterError;
use crate::application::evaluator::Evaluator;
use crate::application::hooks::Hooks;
use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, ConfigSource, Notifier, StatePersistence, SubmissionStore};
use crate::application::reset::ResetPolicy;
use crate::domain::{
    config::LimiterConfig,
    decision::{Decision, Transition},
    resource::{Resource, ResourceId},
    state::{LimiterState, LimiterStatus},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

/// Form fields and actions after the rate limit gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedForm<F, A> {
    pub fields: Vec<F>,
    pub actions: Vec<A>,
    /// `true` when the fields were replaced by the disabled message
    pub disabled: bool,
}

/// Operator-facing snapshot of a form's limiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub resource_id: ResourceId,
    pub status: LimiterStatus,
    pub tripped_at: Option<SystemTime>,
    /// Submissions inside the current window (0 when limiting is inert)
    pub volume: u64,
    pub threshold: u64,
    pub window_secs: u64,
    pub auto_reset: bool,
    /// Whether limiting has any effect for this form
    pub limiting_active: bool,
}

/// Coordinates submission rate limiting for protected forms.
#[derive(Debug, Clone)]
pub struct SubmissionRateLimiter {
    config: Arc<dyn ConfigSource>,
    persistence: Arc<dyn StatePersistence>,
    clock: Arc<dyn Clock>,
    evaluator: Evaluator,
    reset_policy: ResetPolicy,
    dispatch: NotificationDispatch,
    metrics: Metrics,
}

impl SubmissionRateLimiter {
    /// Wire a limiter from its ports.
    ///
    /// Most hosts use [`SubmissionRateLimiter::builder`], which supplies a
    /// system clock and a log-only notifier when none are given.
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        persistence: Arc<dyn StatePersistence>,
        config: Arc<dyn ConfigSource>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        hooks: Hooks,
        metrics: Metrics,
    ) -> Self {
        Self {
            config,
            persistence,
            clock,
            evaluator: Evaluator::with_hooks(Arc::clone(&store), hooks.clone()),
            reset_policy: ResetPolicy::with_hooks(store, hooks),
            dispatch: NotificationDispatch::new(notifier, metrics.clone()),
            metrics,
        }
    }

    /// Re-check the submission rate after a submission was stored.
    ///
    /// Trips the form when the volume inside the window exceeds the
    /// threshold. The trip is persisted with a compare-and-swap and the
    /// "disabled" notice is sent only by the caller that won it, so
    /// concurrent submissions produce one notification.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` if configuration, state or the
    /// submission count cannot be read, or the trip cannot be written.
    pub fn record_submission(&self, resource: &Resource) -> Result<Decision, LimiterError> {
        let config = self.config.resolve(&resource.id)?;
        if !config.is_active() {
            return Ok(Decision::inert());
        }

        let now = self.clock.now();
        let state = self.persistence.load(&resource.id)?;
        self.metrics.record_evaluation();
        let decision = self.evaluator.evaluate(&resource.id, &config, &state, now)?;

        if let Some(Transition::Tripped { at }) = decision.transition {
            let won = self.persistence.compare_and_swap(
                &resource.id,
                state,
                LimiterState::tripped(at),
            )?;

            if !won {
                debug!(resource_id = %resource.id, "trip already recorded by a concurrent writer");
                self.metrics.record_lost_race();
                return Ok(Decision {
                    transition: None,
                    ..decision
                });
            }

            self.metrics.record_trip();
            self.dispatch.notify(resource, true, &config);
        }

        Ok(decision)
    }

    /// Apply the cooldown before a form page is rendered.
    ///
    /// If the form is disabled and the reset policy says it has cooled
    /// down, the trip is cleared and a "re-enabled" notice is sent.
    /// Returns the status the page should render with.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` on store or persistence failure.
    pub fn on_page_view(&self, resource: &Resource) -> Result<LimiterStatus, LimiterError> {
        let config = self.config.resolve(&resource.id)?;
        let now = self.clock.now();
        let state = self.persistence.load(&resource.id)?;

        if !self.disabled_with(&resource.id, &config, &state, now) {
            return Ok(LimiterStatus::Enabled);
        }

        // Disabled by a trip hook alone: there is no stored trip to clear.
        if state.tripped_at.is_none() {
            return Ok(LimiterStatus::Tripped);
        }

        if !self.reset_policy.should_reset(&resource.id, &config, now)? {
            return Ok(LimiterStatus::Tripped);
        }

        if self.clear(resource, &config, state)? {
            return Ok(LimiterStatus::Enabled);
        }

        let current = self.persistence.load(&resource.id)?;
        Ok(if self.disabled_with(&resource.id, &config, &current, now) {
            LimiterStatus::Tripped
        } else {
            LimiterStatus::Enabled
        })
    }

    /// Whether the form is currently disabled by its rate limit.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` on config or persistence failure.
    pub fn is_disabled(&self, resource: &ResourceId) -> Result<bool, LimiterError> {
        let config = self.config.resolve(resource)?;
        if !config.is_active() {
            return Ok(false);
        }
        let state = self.persistence.load(resource)?;
        Ok(self.disabled_with(resource, &config, &state, self.clock.now()))
    }

    /// Explicit operator reset, available whether or not auto reset is on.
    ///
    /// Returns `true` if the form was tripped and is now enabled. A form
    /// that was not tripped is left alone and no notice is sent.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` on config or persistence failure.
    pub fn reset(&self, resource: &Resource) -> Result<bool, LimiterError> {
        let config = self.config.resolve(&resource.id)?;
        let state = self.persistence.load(&resource.id)?;
        if state.tripped_at.is_none() {
            return Ok(false);
        }

        info!(resource_id = %resource.id, title = %resource.title, "operator reset of submission rate limit");
        self.clear(resource, &config, state)
    }

    /// Gate a form's fields and actions.
    ///
    /// While the form is disabled its fields are replaced by a single
    /// item built from the configured disabled message, and its actions
    /// are removed. Otherwise both pass through unchanged.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` on config or persistence failure.
    pub fn gate_form<F, A>(
        &self,
        resource: &ResourceId,
        fields: Vec<F>,
        actions: Vec<A>,
        disabled_notice: impl FnOnce(&str) -> F,
    ) -> Result<GatedForm<F, A>, LimiterError> {
        let config = self.config.resolve(resource)?;
        let disabled = config.is_active() && {
            let state = self.persistence.load(resource)?;
            self.disabled_with(resource, &config, &state, self.clock.now())
        };

        if disabled {
            return Ok(GatedForm {
                fields: vec![disabled_notice(&config.disabled_message)],
                actions: Vec::new(),
                disabled: true,
            });
        }

        Ok(GatedForm {
            fields,
            actions,
            disabled: false,
        })
    }

    /// Report the limiter status of a form.
    ///
    /// # Errors
    /// Returns `LimiterError::Store` on store, config or persistence failure.
    pub fn status(&self, resource: &ResourceId) -> Result<StatusReport, LimiterError> {
        let config = self.config.resolve(resource)?;
        let state = self.persistence.load(resource)?;
        let now = self.clock.now();
        let limiting_active = config.is_active();

        let volume = if limiting_active {
            self.evaluator.volume(resource, &config, now)?
        } else {
            0
        };
        let status = if self.disabled_with(resource, &config, &state, now) {
            LimiterStatus::Tripped
        } else {
            LimiterStatus::Enabled
        };

        Ok(StatusReport {
            resource_id: resource.clone(),
            status,
            tripped_at: state.tripped_at,
            volume,
            threshold: config.threshold,
            window_secs: config.window.as_secs(),
            auto_reset: config.auto_reset,
            limiting_active,
        })
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn disabled_with(
        &self,
        resource: &ResourceId,
        config: &LimiterConfig,
        state: &LimiterState,
        now: SystemTime,
    ) -> bool {
        config.is_active() && self.evaluator.is_tripped(resource, state, now)
    }

    /// Clear a trip. Notifies only if this call performed the write.
    fn clear(
        &self,
        resource: &Resource,
        config: &LimiterConfig,
        expected: LimiterState,
    ) -> Result<bool, LimiterError> {
        if expected.tripped_at.is_none() {
            return Ok(false);
        }

        let won = self
            .persistence
            .compare_and_swap(&resource.id, expected, LimiterState::enabled())?;

        if won {
            self.metrics.record_reset();
            self.dispatch.notify(resource, false, config);
        } else {
            debug!(resource_id = %resource.id, "reset already recorded by a concurrent writer");
            self.metrics.record_lost_race();
        }
        Ok(won)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{ResourceSettings, SiteDefaults};
    use crate::infrastructure::config::LayeredConfigSource;
    use crate::infrastructure::memory::{InMemoryStatePersistence, InMemorySubmissionStore};
    use crate::application::error::StoreError;
    use crate::infrastructure::mocks::{FailingStore, MockClock, RecordingNotifier};
    use std::time::Duration;

    struct Fixture {
        store: Arc<InMemorySubmissionStore>,
        persistence: Arc<InMemoryStatePersistence>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<MockClock>,
        limiter: SubmissionRateLimiter,
    }

    fn fixture(defaults: SiteDefaults) -> Fixture {
        let store = Arc::new(InMemorySubmissionStore::new());
        let persistence = Arc::new(InMemoryStatePersistence::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = Arc::new(MockClock::new(
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        ));
        let config = LayeredConfigSource::builder()
            .with_defaults(defaults)
            .with_override("limited", ResourceSettings::new().with_threshold(2))
            .build()
            .unwrap();

        let limiter = SubmissionRateLimiter::builder()
            .with_store(store.clone())
            .with_persistence(persistence.clone())
            .with_config_source(Arc::new(config))
            .with_notifier(notifier.clone())
            .with_clock(clock.clone())
            .build()
            .unwrap();

        Fixture {
            store,
            persistence,
            notifier,
            clock,
            limiter,
        }
    }

    fn submit(f: &Fixture, resource: &Resource) -> Decision {
        f.store.record(&resource.id, f.clock.now());
        f.limiter.record_submission(resource).unwrap()
    }

    #[test]
    fn test_trips_once_and_notifies_once() {
        let f = fixture(SiteDefaults::default());
        let form = Resource::new("limited", "Contact");

        assert!(!submit(&f, &form).tripped);
        assert!(!submit(&f, &form).tripped);
        let decision = submit(&f, &form);
        assert!(decision.is_new_trip());

        // Further submissions stay tripped without re-tripping
        let decision = submit(&f, &form);
        assert!(decision.tripped);
        assert_eq!(decision.transition, None);

        assert_eq!(f.notifier.logged().len(), 1);
        assert_eq!(f.limiter.metrics().trips(), 1);
        assert!(f.limiter.is_disabled(&form.id).unwrap());
        assert_eq!(
            f.persistence.load(&form.id).unwrap(),
            LimiterState::tripped(f.clock.now())
        );
    }

    #[test]
    fn test_page_view_resets_after_cooldown() {
        let f = fixture(SiteDefaults::default());
        let form = Resource::new("limited", "Contact");
        for _ in 0..3 {
            submit(&f, &form);
        }
        assert!(f.limiter.is_disabled(&form.id).unwrap());

        f.clock.advance(Duration::from_secs(30));
        assert_eq!(f.limiter.on_page_view(&form).unwrap(), LimiterStatus::Tripped);

        f.clock.advance(Duration::from_secs(31));
        assert_eq!(f.limiter.on_page_view(&form).unwrap(), LimiterStatus::Enabled);
        assert!(!f.limiter.is_disabled(&form.id).unwrap());

        let logged = f.notifier.logged();
        assert_eq!(logged.len(), 2);
        assert!(!logged[1].disabled);
    }

    #[test]
    fn test_volume_drop_does_not_clear_trip() {
        let f = fixture(SiteDefaults::default());
        let form = Resource::new("limited", "Contact");
        for _ in 0..3 {
            submit(&f, &form);
        }

        // All submissions age out of the window but one arrives late
        f.clock.advance(Duration::from_secs(59));
        submit(&f, &form);
        f.clock.advance(Duration::from_secs(30));

        let decision = f.limiter.record_submission(&form).unwrap();
        assert!(decision.tripped);
        assert_eq!(f.limiter.on_page_view(&form).unwrap(), LimiterStatus::Tripped);
    }

    #[test]
    fn test_manual_reset_when_auto_reset_off() {
        let f = fixture(SiteDefaults {
            reset_automatically: false,
            ..SiteDefaults::default()
        });
        let form = Resource::new("limited", "Contact");
        for _ in 0..3 {
            submit(&f, &form);
        }

        f.clock.advance(Duration::from_secs(86_400));
        assert_eq!(f.limiter.on_page_view(&form).unwrap(), LimiterStatus::Tripped);

        assert!(f.limiter.reset(&form).unwrap());
        assert!(!f.limiter.is_disabled(&form.id).unwrap());
        assert!(!f.limiter.reset(&form).unwrap());
        assert_eq!(f.notifier.logged().len(), 2);
    }

    #[test]
    fn test_gate_form_replaces_fields_when_disabled() {
        let f = fixture(SiteDefaults::default());
        let form = Resource::new("limited", "Contact");

        let open = f
            .limiter
            .gate_form(&form.id, vec!["name", "email"], vec!["submit"], |_| "notice")
            .unwrap();
        assert!(!open.disabled);
        assert_eq!(open.fields, vec!["name", "email"]);
        assert_eq!(open.actions, vec!["submit"]);

        for _ in 0..3 {
            submit(&f, &form);
        }

        let gated = f
            .limiter
            .gate_form(
                &form.id,
                vec!["name".to_string()],
                vec!["submit"],
                |message| message.to_string(),
            )
            .unwrap();
        assert!(gated.disabled);
        assert_eq!(
            gated.fields,
            vec!["This form is temporarily disabled. Please try again later.".to_string()]
        );
        assert!(gated.actions.is_empty());
    }

    #[test]
    fn test_status_report() {
        let f = fixture(SiteDefaults::default());
        let form = Resource::new("limited", "Contact");
        submit(&f, &form);

        let report = f.limiter.status(&form.id).unwrap();
        assert_eq!(report.status, LimiterStatus::Enabled);
        assert_eq!(report.volume, 1);
        assert_eq!(report.threshold, 2);
        assert_eq!(report.window_secs, 60);
        assert!(report.limiting_active);
        assert_eq!(report.tripped_at, None);
    }

    #[test]
    fn test_master_switch_off_never_trips() {
        let f = fixture(SiteDefaults {
            rate_limiting_enabled: false,
            ..SiteDefaults::default()
        });
        let form = Resource::new("limited", "Contact");
        for _ in 0..10 {
            assert_eq!(submit(&f, &form), Decision::inert());
        }
        assert!(!f.limiter.is_disabled(&form.id).unwrap());
        assert!(f.notifier.logged().is_empty());
        assert_eq!(f.limiter.metrics().evaluations(), 0);
    }

    #[test]
    fn test_failing_persistence_propagates() {
        let store = Arc::new(InMemorySubmissionStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let limiter = SubmissionRateLimiter::builder()
            .with_store(store.clone())
            .with_persistence(Arc::new(FailingStore::new()))
            .with_config_source(Arc::new(LayeredConfigSource::new()))
            .with_notifier(notifier.clone())
            .build()
            .unwrap();
        let form = Resource::new("contact", "Contact");
        store.record(&form.id, SystemTime::now());

        let unavailable = LimiterError::Store(StoreError::Unavailable("backend offline".into()));
        assert_eq!(limiter.record_submission(&form).unwrap_err(), unavailable);
        assert_eq!(limiter.on_page_view(&form).unwrap_err(), unavailable);
        assert_eq!(limiter.reset(&form).unwrap_err(), unavailable);
        assert!(notifier.logged().is_empty());
    }

    #[test]
    fn test_failing_config_source_propagates() {
        let limiter = SubmissionRateLimiter::builder()
            .with_store(Arc::new(InMemorySubmissionStore::new()))
            .with_persistence(Arc::new(InMemoryStatePersistence::new()))
            .with_config_source(Arc::new(FailingStore::with_reason("settings table missing")))
            .build()
            .unwrap();
        let form = Resource::new("contact", "Contact");

        for err in [
            limiter.record_submission(&form).unwrap_err(),
            limiter.on_page_view(&form).unwrap_err(),
            limiter.reset(&form).unwrap_err(),
            limiter.status(&form.id).unwrap_err(),
        ] {
            assert!(matches!(err, LimiterError::Store(StoreError::Unavailable(ref r)) if r == "settings table missing"));
        }
        assert_eq!(limiter.metrics().evaluations(), 0);
    }

    #[test]
    fn test_clear_refuses_untripped_state() {
        let f = fixture(SiteDefaults::default());
        let form = Resource::new("limited", "Contact");
        let config = LimiterConfig::default();

        assert!(!f.limiter.clear(&form, &config, LimiterState::enabled()).unwrap());
        assert_eq!(f.limiter.metrics().resets(), 0);
        assert_eq!(f.limiter.metrics().lost_races(), 0);
        assert!(f.notifier.logged().is_empty());
    }
}
