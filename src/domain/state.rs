//! Persisted limiter state and the two-state machine it encodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// The two states of a protected form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimiterStatus {
    /// Accepting submissions
    Enabled,
    /// Disabled after the submission rate limit was exceeded
    Tripped,
}

impl fmt::Display for LimiterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimiterStatus::Enabled => f.write_str("enabled"),
            LimiterStatus::Tripped => f.write_str("tripped"),
        }
    }
}

/// Limiter state stored alongside a protected form.
///
/// An absent record is equivalent to `LimiterState::default()`, i.e. not
/// tripped.
///
/// `tripped_at` only ever moves from `None` to a timestamp (trip) or from a
/// timestamp back to `None` (reset). A later timestamp can only be written
/// after a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LimiterState {
    pub tripped_at: Option<SystemTime>,
}

impl LimiterState {
    /// State of a form that has never tripped, or has been reset.
    pub fn enabled() -> Self {
        Self { tripped_at: None }
    }

    pub fn tripped(at: SystemTime) -> Self {
        Self {
            tripped_at: Some(at),
        }
    }

    /// Whether the form counts as tripped at `now`.
    ///
    /// A trip timestamp in the future does not count yet.
    pub fn is_tripped_at(&self, now: SystemTime) -> bool {
        matches!(self.tripped_at, Some(at) if at <= now)
    }

    pub fn status_at(&self, now: SystemTime) -> LimiterStatus {
        if self.is_tripped_at(now) {
            LimiterStatus::Tripped
        } else {
            LimiterStatus::Enabled
        }
    }

    /// Whether writing `next` over `self` respects the monotonic rule.
    pub fn permits(&self, next: &LimiterState) -> bool {
        match (self.tripped_at, next.tripped_at) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(current), Some(next)) => current == next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_is_enabled() {
        let state = LimiterState::default();
        assert_eq!(state, LimiterState::enabled());
        assert_eq!(state.status_at(SystemTime::now()), LimiterStatus::Enabled);
    }

    #[test]
    fn test_tripped_in_past_counts() {
        let now = SystemTime::now();
        let state = LimiterState::tripped(now - Duration::from_secs(5));
        assert!(state.is_tripped_at(now));
        assert!(LimiterState::tripped(now).is_tripped_at(now));
        assert_eq!(state.status_at(now), LimiterStatus::Tripped);
    }

    #[test]
    fn test_tripped_in_future_does_not_count() {
        let now = SystemTime::now();
        let state = LimiterState::tripped(now + Duration::from_secs(5));
        assert!(!state.is_tripped_at(now));
    }

    #[test]
    fn test_monotonic_transitions() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let t1 = t0 + Duration::from_secs(10);
        let enabled = LimiterState::enabled();
        let tripped = LimiterState::tripped(t0);

        assert!(enabled.permits(&tripped));
        assert!(tripped.permits(&enabled));
        assert!(tripped.permits(&tripped));
        assert!(!tripped.permits(&LimiterState::tripped(t1)));
        assert!(!LimiterState::tripped(t1).permits(&tripped));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&LimiterStatus::Tripped).unwrap();
        assert_eq!(json, "\"tripped\"");
    }
}
