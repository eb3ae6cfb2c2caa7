//! Example demonstrating Redis-backed limiter state.
//!
//! Several host processes can share the tripped/enabled state of a form by
//! pointing `RedisStatePersistence` at the same server. Submission history
//! stays with each host's own store.
//!
//! # Quick Start
//!
//! 1. Start Redis:
//!    ```bash
//!    docker run -p 6379:6379 redis:7-alpine
//!    ```
//!
//! 2. Run the example (from project root):
//!    ```bash
//!    cargo run --example redis --features redis-storage
//!    ```
//!
//! Run it twice: the second run finds the form already disabled by the
//! first, until the cooldown clears it.

use form_throttle::{
    InMemorySubmissionStore, LayeredConfigSource, RedisPersistenceConfig, RedisStatePersistence,
    Resource, ResourceSettings, SubmissionRateLimiter,
};
use std::sync::Arc;
use std::time::SystemTime;
use tracing_subscriber::prelude::*;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let persistence = RedisStatePersistence::open_with_config(
        "redis://127.0.0.1/",
        RedisPersistenceConfig {
            key_prefix: "form-throttle-example:".to_string(),
        },
    )
    .expect("invalid Redis URL");

    let store = Arc::new(InMemorySubmissionStore::new());
    let config = LayeredConfigSource::builder()
        .with_override("contact", ResourceSettings::new().with_threshold(2))
        .build()
        .expect("valid configuration");

    let limiter = SubmissionRateLimiter::builder()
        .with_store(store.clone())
        .with_persistence(Arc::new(persistence))
        .with_config_source(Arc::new(config))
        .build()
        .expect("all required ports supplied");

    let form = Resource::new("contact", "Contact us");

    println!("=== Redis Persistence Example ===\n");

    match limiter.on_page_view(&form) {
        Ok(status) => println!("Status on page view: {}", status),
        Err(e) => {
            eprintln!("Redis unavailable: {}", e);
            return;
        }
    }

    for i in 1..=3 {
        store.record(&form.id, SystemTime::now());
        match limiter.record_submission(&form) {
            Ok(decision) => println!(
                "Submission {}: volume={} new trip={}",
                i,
                decision.volume,
                decision.is_new_trip()
            ),
            Err(e) => eprintln!("Submission {} failed: {}", i, e),
        }
    }

    match limiter.status(&form.id) {
        Ok(report) => println!("\nShared state: {} (tripped at {:?})", report.status, report.tripped_at),
        Err(e) => eprintln!("Status failed: {}", e),
    }
}
