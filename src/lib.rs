//! # form-throttle
//!
//! Submission rate limiting for web forms.
//!
//! A protected form is automatically disabled when too many submissions
//! arrive inside a sliding time window, and is re-enabled after a cooldown
//! (or by an operator). Every transition produces a notice in the log and,
//! when an address is configured, a single e-mail.
//!
//! ## Quick Start
//!
//! ```rust
//! use form_throttle::{
//!     InMemoryStatePersistence, InMemorySubmissionStore, LayeredConfigSource, Resource,
//!     ResourceSettings, SubmissionRateLimiter,
//! };
//! use std::sync::Arc;
//! use std::time::SystemTime;
//!
//! let store = Arc::new(InMemorySubmissionStore::new());
//! let config = LayeredConfigSource::builder()
//!     .with_override("contact", ResourceSettings::new().with_threshold(2))
//!     .build()
//!     .unwrap();
//!
//! let limiter = SubmissionRateLimiter::builder()
//!     .with_store(store.clone())
//!     .with_persistence(Arc::new(InMemoryStatePersistence::new()))
//!     .with_config_source(Arc::new(config))
//!     .build()
//!     .unwrap();
//!
//! let form = Resource::new("contact", "Contact us");
//! for _ in 0..3 {
//!     // The host stores the submission, then asks the limiter to re-check
//!     store.record(&form.id, SystemTime::now());
//!     limiter.record_submission(&form).unwrap();
//! }
//!
//! assert!(limiter.is_disabled(&form.id).unwrap());
//! ```
//!
//! ## How it works
//!
//! - **Trip**: after each submission the number of submissions created in
//!   the last `window` is compared with `threshold`. Exceeding it records
//!   a trip timestamp.
//! - **Sticky**: a tripped form stays disabled even if the volume drops.
//! - **Cooldown**: with auto reset on, a page view clears the trip once
//!   more than `window` has passed since the most recent submission.
//! - **Inert**: a zero threshold, a zero window, a disabled form or the
//!   site-wide kill switch turn limiting off for that form.
//!
//! State changes go through [`StatePersistence::compare_and_swap`], so
//! concurrent submissions produce one trip and one notice.
//!
//! ## Extension points
//!
//! - Ports in [`application::ports`] let hosts plug in their own submission
//!   store, state persistence, configuration and mail transport.
//! - [`Hooks`] let hosts adjust the computed volume, the tripped flag and
//!   the reset decision.
//!
//! ## Observability
//!
//! Notices are emitted as `WARN` events through `tracing`. Counters for
//! evaluations, trips, resets and e-mail delivery are available from
//! [`SubmissionRateLimiter::metrics`]:
//!
//! ```rust,no_run
//! # use form_throttle::SubmissionRateLimiter;
//! # fn report(limiter: &SubmissionRateLimiter) {
//! let snapshot = limiter.metrics().snapshot();
//! println!("trips: {}, resets: {}", snapshot.trips, snapshot.resets);
//! println!("e-mail failure rate: {:.1}%", snapshot.email_failure_rate() * 100.0);
//! # }
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    address::is_plausible_email_address,
    config::{LimiterConfig, ResourceSettings, SiteDefaults, WindowChoice},
    decision::{Decision, Transition},
    notice::Notice,
    resource::{Resource, ResourceId, SubmissionRecord},
    state::{LimiterState, LimiterStatus},
};

pub use application::{
    dispatch::{EmailOutcome, NotificationDispatch},
    error::{DeliveryError, LimiterError, StoreError},
    evaluator::Evaluator,
    hooks::{Hooks, ResetFn, ResetHook, TripHook, VolumeHook},
    limiter::{GatedForm, StatusReport, SubmissionRateLimiter},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, ConfigSource, Email, MailTransport, Notifier, StatePersistence, SubmissionStore},
    reset::ResetPolicy,
};

pub use infrastructure::{
    builder::{BuildError, SubmissionRateLimiterBuilder},
    clock::SystemClock,
    config::{ConfigError, LayeredConfigSource, LayeredConfigSourceBuilder},
    memory::{InMemoryStatePersistence, InMemorySubmissionStore},
    notifier::TracingNotifier,
};

#[cfg(feature = "redis-storage")]
pub use infrastructure::redis_persistence::{RedisPersistenceConfig, RedisStatePersistence};
