//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Wiring the rate limiter from its ports (builder with defaults)
//! - Clock abstraction (system time vs mock)
//! - In-memory submission store and state persistence (sharded maps)
//! - Layered configuration (site defaults plus per-form overrides)
//! - Notification through `tracing` and an optional mail transport

pub mod builder;
pub mod clock;
pub mod config;
pub mod memory;
pub mod notifier;

#[cfg(feature = "redis-storage")]
pub mod redis_persistence;

/// Mock implementations for testing.
///
/// This module is only available when the `test-helpers` feature is enabled,
/// or during test builds. It provides controllable test doubles for the
/// clock, the notifier and failing backends.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// form-throttle = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;
