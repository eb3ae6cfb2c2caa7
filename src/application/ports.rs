//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. The host application, or the adapters in `infrastructure`,
//! implement these ports.

use crate::application::error::{DeliveryError, StoreError};
use crate::domain::{
    config::LimiterConfig,
    notice::Notice,
    resource::{ResourceId, SubmissionRecord},
    state::LimiterState,
};
use std::fmt::Debug;
use std::time::SystemTime;

/// Port for obtaining current wall-clock time.
///
/// Submission timestamps are persisted, so this is `SystemTime` rather
/// than a monotonic `Instant`. Infrastructure provides `SystemClock` and,
/// for tests, `MockClock`.
pub trait Clock: Send + Sync + Debug {
    /// Get the current time.
    fn now(&self) -> SystemTime;
}

/// Port for the append-only log of past submissions.
pub trait SubmissionStore: Send + Sync + Debug {
    /// Count submissions for `resource` created strictly after `since`.
    fn count_since(&self, resource: &ResourceId, since: SystemTime) -> Result<u64, StoreError>;

    /// The most recent submission for `resource`, if any.
    fn most_recent(&self, resource: &ResourceId) -> Result<Option<SubmissionRecord>, StoreError>;
}

/// Port resolving the effective configuration of a form.
pub trait ConfigSource: Send + Sync + Debug {
    /// Resolve per-form overrides over the process-wide defaults.
    fn resolve(&self, resource: &ResourceId) -> Result<LimiterConfig, StoreError>;
}

/// Port for durable limiter state.
pub trait StatePersistence: Send + Sync + Debug {
    /// Load the state for `resource`. Absent state is `LimiterState::default()`.
    fn load(&self, resource: &ResourceId) -> Result<LimiterState, StoreError>;

    /// Unconditionally store `state` for `resource`.
    fn save(&self, resource: &ResourceId, state: LimiterState) -> Result<(), StoreError>;

    /// Store `next` only if the current state equals `expected`.
    ///
    /// Returns `Ok(true)` when the write happened. Callers notify only after
    /// a successful swap, which bounds notifications to one per transition
    /// even when evaluations race.
    fn compare_and_swap(
        &self,
        resource: &ResourceId,
        expected: LimiterState,
        next: LimiterState,
    ) -> Result<bool, StoreError>;
}

/// Port delivering trip and reset notices.
pub trait Notifier: Send + Sync + Debug {
    /// Record the notice in the log sink. Must not fail.
    fn log(&self, notice: &Notice);

    /// Send an e-mail. One attempt, no retries.
    fn email(&self, address: &str, subject: &str, body: &str) -> Result<(), DeliveryError>;
}

/// An outgoing e-mail handed to a [`MailTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Port for the host's mail facility.
pub trait MailTransport: Send + Sync + Debug {
    fn send(&self, email: &Email) -> Result<(), DeliveryError>;
}
