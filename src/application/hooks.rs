//! Adjustment hooks.
//!
//! Host code can subscribe to three points of an evaluation and adjust the
//! value before it is used:
//! - the counted submission volume
//! - the "already tripped" verdict
//! - the reset policy's verdict
//!
//! Hooks run in registration order. Closures with the right signature
//! implement the hook traits directly.

use crate::domain::resource::ResourceId;
use std::fmt;
use std::sync::Arc;

/// Adjusts the submission volume counted for a form.
pub trait VolumeHook: Send + Sync {
    fn adjust_volume(&self, resource: &ResourceId, volume: &mut u64);
}

/// Adjusts whether a form counts as already tripped.
pub trait TripHook: Send + Sync {
    fn adjust_tripped(&self, resource: &ResourceId, tripped: &mut bool);
}

/// Adjusts whether a tripped form should be reset.
pub trait ResetHook: Send + Sync {
    fn adjust_should_reset(&self, resource: &ResourceId, should_reset: &mut bool);
}

impl<F> VolumeHook for F
where
    F: Fn(&ResourceId, &mut u64) + Send + Sync,
{
    fn adjust_volume(&self, resource: &ResourceId, volume: &mut u64) {
        self(resource, volume)
    }
}

impl<F> TripHook for F
where
    F: Fn(&ResourceId, &mut bool) + Send + Sync,
{
    fn adjust_tripped(&self, resource: &ResourceId, tripped: &mut bool) {
        self(resource, tripped)
    }
}

/// Wrapper so reset hooks can be closures without clashing with the
/// blanket [`TripHook`] impl, which has the same signature.
pub struct ResetFn<F>(pub F);

impl<F> ResetHook for ResetFn<F>
where
    F: Fn(&ResourceId, &mut bool) + Send + Sync,
{
    fn adjust_should_reset(&self, resource: &ResourceId, should_reset: &mut bool) {
        (self.0)(resource, should_reset)
    }
}

/// Registered hooks, shared by the evaluator and the reset policy.
#[derive(Clone, Default)]
pub struct Hooks {
    volume: Vec<Arc<dyn VolumeHook>>,
    trip: Vec<Arc<dyn TripHook>>,
    reset: Vec<Arc<dyn ResetHook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume_hook(mut self, hook: impl VolumeHook + 'static) -> Self {
        self.volume.push(Arc::new(hook));
        self
    }

    pub fn with_trip_hook(mut self, hook: impl TripHook + 'static) -> Self {
        self.trip.push(Arc::new(hook));
        self
    }

    pub fn with_reset_hook(mut self, hook: impl ResetHook + 'static) -> Self {
        self.reset.push(Arc::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.volume.is_empty() && self.trip.is_empty() && self.reset.is_empty()
    }

    pub(crate) fn adjust_volume(&self, resource: &ResourceId, volume: &mut u64) {
        for hook in &self.volume {
            hook.adjust_volume(resource, volume);
        }
    }

    pub(crate) fn adjust_tripped(&self, resource: &ResourceId, tripped: &mut bool) {
        for hook in &self.trip {
            hook.adjust_tripped(resource, tripped);
        }
    }

    pub(crate) fn adjust_should_reset(&self, resource: &ResourceId, should_reset: &mut bool) {
        for hook in &self.reset {
            hook.adjust_should_reset(resource, should_reset);
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("volume", &self.volume.len())
            .field("trip", &self.trip.len())
            .field("reset", &self.reset.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_run_in_registration_order() {
        let hooks = Hooks::new()
            .with_volume_hook(|_: &ResourceId, v: &mut u64| *v += 1)
            .with_volume_hook(|_: &ResourceId, v: &mut u64| *v *= 10);

        let mut volume = 4;
        hooks.adjust_volume(&ResourceId::new("a"), &mut volume);
        assert_eq!(volume, 50);
    }

    #[test]
    fn test_hooks_see_resource_id() {
        let hooks = Hooks::new().with_trip_hook(|id: &ResourceId, t: &mut bool| {
            if id.as_str() == "exempt" {
                *t = false;
            }
        });

        let mut tripped = true;
        hooks.adjust_tripped(&ResourceId::new("exempt"), &mut tripped);
        assert!(!tripped);

        let mut tripped = true;
        hooks.adjust_tripped(&ResourceId::new("other"), &mut tripped);
        assert!(tripped);
    }

    #[test]
    fn test_reset_hook_wrapper() {
        let hooks = Hooks::new().with_reset_hook(ResetFn(|_: &ResourceId, r: &mut bool| *r = false));
        let mut should = true;
        hooks.adjust_should_reset(&ResourceId::new("a"), &mut should);
        assert!(!should);
        assert!(!hooks.is_empty());
    }
}
