//! Failing backend for testing error propagation.

use crate::application::error::StoreError;
use crate::application::ports::{ConfigSource, StatePersistence, SubmissionStore};
use crate::domain::{
    config::LimiterConfig,
    resource::{ResourceId, SubmissionRecord},
    state::LimiterState,
};
use std::time::SystemTime;

/// Store, config source and persistence that fail every call.
#[derive(Debug, Clone)]
pub struct FailingStore {
    reason: String,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::with_reason("backend offline")
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Unavailable(self.reason.clone())
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionStore for FailingStore {
    fn count_since(&self, _resource: &ResourceId, _since: SystemTime) -> Result<u64, StoreError> {
        Err(self.error())
    }

    fn most_recent(&self, _resource: &ResourceId) -> Result<Option<SubmissionRecord>, StoreError> {
        Err(self.error())
    }
}

impl ConfigSource for FailingStore {
    fn resolve(&self, _resource: &ResourceId) -> Result<LimiterConfig, StoreError> {
        Err(self.error())
    }
}

impl StatePersistence for FailingStore {
    fn load(&self, _resource: &ResourceId) -> Result<LimiterState, StoreError> {
        Err(self.error())
    }

    fn save(&self, _resource: &ResourceId, _state: LimiterState) -> Result<(), StoreError> {
        Err(self.error())
    }

    fn compare_and_swap(
        &self,
        _resource: &ResourceId,
        _expected: LimiterState,
        _next: LimiterState,
    ) -> Result<bool, StoreError> {
        Err(self.error())
    }
}
