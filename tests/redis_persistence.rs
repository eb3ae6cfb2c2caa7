//! Integration tests for Redis persistence.
//!
//! These tests require a Redis instance running at `redis://127.0.0.1/`.
//! Tests are ignored by default - run with `cargo test --features redis-storage --test redis_persistence -- --ignored`

#![cfg(feature = "redis-storage")]

use form_throttle::{
    LimiterState, RedisPersistenceConfig, RedisStatePersistence, ResourceId, StatePersistence,
};
use std::time::{Duration, SystemTime};

/// Create a test persistence with unique prefix, or `None` if Redis is down
fn create_test_persistence(test_name: &str) -> Option<RedisStatePersistence> {
    let config = RedisPersistenceConfig {
        key_prefix: format!("test:{}:", test_name),
    };
    let persistence =
        RedisStatePersistence::open_with_config("redis://127.0.0.1/", config).ok()?;
    if persistence.clear().is_err() {
        eprintln!("Skipping test: Redis not available at redis://127.0.0.1/");
        return None;
    }
    Some(persistence)
}

#[test]
#[ignore] // Requires Redis
fn test_redis_round_trip() {
    let Some(persistence) = create_test_persistence("round_trip") else {
        return;
    };
    let id = ResourceId::from(1u64);
    let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    assert_eq!(persistence.load(&id).unwrap(), LimiterState::default());

    persistence.save(&id, LimiterState::tripped(at)).unwrap();
    assert_eq!(persistence.load(&id).unwrap().tripped_at, Some(at));

    persistence.save(&id, LimiterState::enabled()).unwrap();
    assert_eq!(persistence.load(&id).unwrap().tripped_at, None);

    persistence.clear().unwrap();
}

#[test]
#[ignore] // Requires Redis
fn test_redis_compare_and_swap() {
    let Some(persistence) = create_test_persistence("cas") else {
        return;
    };
    let id = ResourceId::from("contact");
    let at = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    assert!(persistence
        .compare_and_swap(&id, LimiterState::enabled(), LimiterState::tripped(at))
        .unwrap());
    // Stale expectation loses
    assert!(!persistence
        .compare_and_swap(&id, LimiterState::enabled(), LimiterState::tripped(at))
        .unwrap());
    assert!(persistence
        .compare_and_swap(&id, LimiterState::tripped(at), LimiterState::enabled())
        .unwrap());

    persistence.clear().unwrap();
}

#[test]
#[ignore] // Requires Redis
fn test_redis_prefixes_isolate_sites() {
    let (Some(a), Some(b)) = (
        create_test_persistence("site_a"),
        create_test_persistence("site_b"),
    ) else {
        return;
    };
    let id = ResourceId::from(9u64);
    let at = SystemTime::UNIX_EPOCH + Duration::from_secs(42);

    a.save(&id, LimiterState::tripped(at)).unwrap();
    assert_eq!(b.load(&id).unwrap(), LimiterState::default());

    a.clear().unwrap();
    b.clear().unwrap();
}
