//! Basic example demonstrating submission rate limiting for one form.
//!
//! This example protects a contact form with a limit of 3 submissions per
//! 10 seconds. It submits until the form trips, shows the gated form, and
//! waits for the cooldown to re-enable it on the next page view.
//!
//! ```bash
//! cargo run --example basic
//! ```

use form_throttle::{
    InMemoryStatePersistence, InMemorySubmissionStore, LayeredConfigSource, LimiterStatus,
    Resource, ResourceSettings, SubmissionRateLimiter,
};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};
use tracing_subscriber::prelude::*;

fn main() {
    // Trip and reset notices are emitted as WARN events
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = Arc::new(InMemorySubmissionStore::new());
    let config = LayeredConfigSource::builder()
        .with_override(
            "contact",
            ResourceSettings::new()
                .with_threshold(3)
                .with_window(Duration::from_secs(10))
                .with_disabled_message("Too many messages right now, please come back later."),
        )
        .build()
        .expect("valid configuration");

    let limiter = SubmissionRateLimiter::builder()
        .with_store(store.clone())
        .with_persistence(Arc::new(InMemoryStatePersistence::new()))
        .with_config_source(Arc::new(config))
        .build()
        .expect("all required ports supplied");

    let form = Resource::new("contact", "Contact us");
    let fields = vec!["name", "email", "message"];
    let actions = vec!["send"];

    println!("=== Basic Submission Rate Limiting Example ===\n");
    println!("Limit: more than 3 submissions in 10 seconds disables the form\n");

    for i in 1..=5 {
        store.record(&form.id, SystemTime::now());
        let decision = limiter
            .record_submission(&form)
            .expect("in-memory store cannot fail");
        println!(
            "Submission {}: volume={} tripped={}",
            i, decision.volume, decision.tripped
        );
    }

    let gated = limiter
        .gate_form(&form.id, fields.clone(), actions.clone(), |_| "notice")
        .expect("in-memory store cannot fail");
    println!("\nForm while disabled: fields={:?} actions={:?}", gated.fields, gated.actions);

    let report = limiter.status(&form.id).expect("in-memory store cannot fail");
    println!("Status: {}", report.status);

    println!("\nWaiting 11 seconds for the cooldown...");
    thread::sleep(Duration::from_secs(11));

    let status = limiter
        .on_page_view(&form)
        .expect("in-memory store cannot fail");
    assert_eq!(status, LimiterStatus::Enabled);

    let gated = limiter
        .gate_form(&form.id, fields, actions, |_| "notice")
        .expect("in-memory store cannot fail");
    println!("Form after page view: fields={:?} actions={:?}", gated.fields, gated.actions);

    let snapshot = limiter.metrics().snapshot();
    println!(
        "\nMetrics: evaluations={} trips={} resets={}",
        snapshot.evaluations, snapshot.trips, snapshot.resets
    );
}
