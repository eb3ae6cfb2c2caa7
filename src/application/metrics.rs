//! Observability metrics for submission rate limiting.
//!
//! Provides counters about evaluations, transitions and notifications for
//! monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking rate limiter activity.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    /// Evaluations that counted submission volume
    evaluations: AtomicU64,
    /// Forms disabled after exceeding their threshold
    trips: AtomicU64,
    /// Forms re-enabled (cooldown or operator)
    resets: AtomicU64,
    /// Transitions lost to a concurrent writer
    lost_races: AtomicU64,
    /// Notices written to the log sink
    notices_logged: AtomicU64,
    /// E-mails handed to the notifier successfully
    emails_sent: AtomicU64,
    /// E-mails whose delivery failed
    email_failures: AtomicU64,
    /// E-mails not attempted because the address was malformed
    emails_skipped: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    pub(crate) fn record_evaluation(&self) {
        self.inner.evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_trip(&self) {
        self.inner.trips.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reset(&self) {
        self.inner.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lost_race(&self) {
        self.inner.lost_races.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_notice_logged(&self) {
        self.inner.notices_logged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_email_sent(&self) {
        self.inner.emails_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_email_failure(&self) {
        self.inner.email_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_email_skipped(&self) {
        self.inner.emails_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn evaluations(&self) -> u64 {
        self.inner.evaluations.load(Ordering::Relaxed)
    }

    pub fn trips(&self) -> u64 {
        self.inner.trips.load(Ordering::Relaxed)
    }

    pub fn resets(&self) -> u64 {
        self.inner.resets.load(Ordering::Relaxed)
    }

    pub fn lost_races(&self) -> u64 {
        self.inner.lost_races.load(Ordering::Relaxed)
    }

    pub fn notices_logged(&self) -> u64 {
        self.inner.notices_logged.load(Ordering::Relaxed)
    }

    pub fn emails_sent(&self) -> u64 {
        self.inner.emails_sent.load(Ordering::Relaxed)
    }

    pub fn email_failures(&self) -> u64 {
        self.inner.email_failures.load(Ordering::Relaxed)
    }

    pub fn emails_skipped(&self) -> u64 {
        self.inner.emails_skipped.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            evaluations: self.evaluations(),
            trips: self.trips(),
            resets: self.resets(),
            lost_races: self.lost_races(),
            notices_logged: self.notices_logged(),
            emails_sent: self.emails_sent(),
            email_failures: self.email_failures(),
            emails_skipped: self.emails_skipped(),
        }
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        let inner = &self.inner;
        for counter in [
            &inner.evaluations,
            &inner.trips,
            &inner.resets,
            &inner.lost_races,
            &inner.notices_logged,
            &inner.emails_sent,
            &inner.email_failures,
            &inner.emails_skipped,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub evaluations: u64,
    pub trips: u64,
    pub resets: u64,
    pub lost_races: u64,
    pub notices_logged: u64,
    pub emails_sent: u64,
    pub email_failures: u64,
    pub emails_skipped: u64,
}

impl MetricsSnapshot {
    /// Total e-mail attempts (sent or failed).
    pub fn email_attempts(&self) -> u64 {
        self.emails_sent.saturating_add(self.email_failures)
    }

    /// Fraction of e-mail attempts that failed (0.0 to 1.0).
    ///
    /// Returns 0.0 if no e-mail was attempted.
    pub fn email_failure_rate(&self) -> f64 {
        let attempts = self.email_attempts();
        if attempts == 0 {
            0.0
        } else {
            self.email_failures as f64 / attempts as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_record_transitions() {
        let metrics = Metrics::new();
        metrics.record_evaluation();
        metrics.record_evaluation();
        metrics.record_trip();
        metrics.record_reset();
        metrics.record_lost_race();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.evaluations, 2);
        assert_eq!(snapshot.trips, 1);
        assert_eq!(snapshot.resets, 1);
        assert_eq!(snapshot.lost_races, 1);
    }

    #[test]
    fn test_email_failure_rate() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().email_failure_rate(), 0.0);

        metrics.record_email_sent();
        metrics.record_email_failure();
        assert!((metrics.snapshot().email_failure_rate() - 0.5).abs() < f64::EPSILON);

        // Skipped e-mails are not attempts
        metrics.record_email_skipped();
        assert_eq!(metrics.snapshot().email_attempts(), 2);
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        metrics.record_trip();
        metrics.record_notice_logged();
        metrics.record_email_sent();

        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_metrics_clone() {
        let metrics1 = Metrics::new();
        metrics1.record_trip();

        let metrics2 = metrics1.clone();
        metrics2.record_trip();

        // Both should see the same value (shared Arc)
        assert_eq!(metrics1.trips(), 2);
        assert_eq!(metrics2.trips(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::thread;

        let metrics = Metrics::new();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_evaluation();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.evaluations(), 1000);
    }
}
