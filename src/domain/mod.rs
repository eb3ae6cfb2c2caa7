//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of submission rate limiting:
//! - Form identity and submission records
//! - Layered rate limit configuration
//! - Persisted limiter state (enabled / tripped)
//! - Evaluation decisions and trip/reset notices
//!
//! All types in this layer are pure and easily testable.

pub mod address;
pub mod config;
pub mod decision;
pub mod notice;
pub mod resource;
pub mod state;
