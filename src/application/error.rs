//! Error types for the application layer.
//!
//! Three classes of failure exist:
//! - configuration problems are not errors: an incomplete config makes
//!   the limiter inert
//! - [`DeliveryError`] is raised by notifiers and always swallowed
//! - [`StoreError`] is raised by the store and persistence ports and
//!   propagates to the caller as [`LimiterError`]

use std::fmt;

/// Failure of a submission store, config source or persistence backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached
    Unavailable(String),
    /// Stored data could not be decoded
    Corrupted(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(reason) => write!(f, "store unavailable: {}", reason),
            StoreError::Corrupted(reason) => write!(f, "stored data corrupted: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// Failure to deliver an e-mail notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// No mail transport is configured
    NoTransport,
    /// The transport failed while sending
    Transport(String),
    /// The transport refused the message
    Rejected(String),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryError::NoTransport => write!(f, "no mail transport configured"),
            DeliveryError::Transport(reason) => write!(f, "mail transport failed: {}", reason),
            DeliveryError::Rejected(reason) => write!(f, "message rejected: {}", reason),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Error returned by rate limiter operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimiterError {
    /// A store or persistence port failed; no decision could be made
    Store(StoreError),
}

impl fmt::Display for LimiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimiterError::Store(e) => write!(f, "rate limit evaluation failed: {}", e),
        }
    }
}

impl std::error::Error for LimiterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LimiterError::Store(e) => Some(e),
        }
    }
}

impl From<StoreError> for LimiterError {
    fn from(e: StoreError) -> Self {
        LimiterError::Store(e)
    }
}
