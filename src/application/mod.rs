//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Evaluator (volume and trip decisions)
//! - Reset policy (cooldown since the last submission)
//! - Notification dispatch (log plus optional e-mail)
//! - Rate limiter facade (state transitions with compare-and-swap)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod dispatch;
pub mod error;
pub mod evaluator;
pub mod hooks;
pub mod limiter;
pub mod metrics;
pub mod ports;
pub mod reset;
