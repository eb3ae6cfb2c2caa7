//! In-memory adapters for the submission store and state persistence.
//!
//! Both are backed by DashMap, which gives fine-grained per-shard locking.
//! They suit single-process hosts and tests; state is lost on restart.

use crate::application::error::StoreError;
use crate::application::ports::{StatePersistence, SubmissionStore};
use crate::domain::{
    resource::{ResourceId, SubmissionRecord},
    state::LimiterState,
};
use ahash::RandomState;
use dashmap::DashMap;
use std::time::SystemTime;

/// Append-only submission log kept in memory.
#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    submissions: DashMap<ResourceId, Vec<SystemTime>, RandomState>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submission for `resource` created at `at`.
    pub fn record(&self, resource: &ResourceId, at: SystemTime) {
        self.submissions
            .entry(resource.clone())
            .or_default()
            .push(at);
    }

    /// Total submissions recorded for `resource`.
    pub fn count(&self, resource: &ResourceId) -> usize {
        self.submissions
            .get(resource)
            .map(|entry| entry.len())
            .unwrap_or(0)
    }

    /// Drop submissions created at or before `before`, across all forms.
    ///
    /// Returns the number of records removed.
    pub fn prune(&self, before: SystemTime) -> usize {
        let mut removed = 0;
        self.submissions.retain(|_, times| {
            let len = times.len();
            times.retain(|at| *at > before);
            removed += len - times.len();
            !times.is_empty()
        });
        removed
    }

    pub fn clear(&self) {
        self.submissions.clear();
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn count_since(&self, resource: &ResourceId, since: SystemTime) -> Result<u64, StoreError> {
        let count = self
            .submissions
            .get(resource)
            .map(|times| times.iter().filter(|at| **at > since).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    fn most_recent(&self, resource: &ResourceId) -> Result<Option<SubmissionRecord>, StoreError> {
        Ok(self.submissions.get(resource).and_then(|times| {
            times
                .iter()
                .max()
                .map(|at| SubmissionRecord::new(resource.clone(), *at))
        }))
    }
}

/// Limiter state kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryStatePersistence {
    states: DashMap<ResourceId, LimiterState, RandomState>,
}

impl InMemoryStatePersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of forms with stored state.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl StatePersistence for InMemoryStatePersistence {
    fn load(&self, resource: &ResourceId) -> Result<LimiterState, StoreError> {
        Ok(self
            .states
            .get(resource)
            .map(|state| *state)
            .unwrap_or_default())
    }

    fn save(&self, resource: &ResourceId, state: LimiterState) -> Result<(), StoreError> {
        self.states.insert(resource.clone(), state);
        Ok(())
    }

    fn compare_and_swap(
        &self,
        resource: &ResourceId,
        expected: LimiterState,
        next: LimiterState,
    ) -> Result<bool, StoreError> {
        // The entry guard holds the shard lock for the whole read-compare-write.
        let mut entry = self.states.entry(resource.clone()).or_default();
        let current = *entry;
        if current != expected || !current.permits(&next) {
            return Ok(false);
        }
        *entry = next;
        Ok(true)
    }
}
