//! Layered configuration source.
//!
//! Resolves per-form [`ResourceSettings`] over process-wide
//! [`SiteDefaults`]. The defaults are fixed at build time; per-form
//! overrides can be replaced at runtime as editors change them.

use crate::application::error::StoreError;
use crate::application::ports::ConfigSource;
use crate::domain::{
    config::{LimiterConfig, ResourceSettings, SiteDefaults},
    resource::ResourceId,
};
use ahash::RandomState;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Error returned when configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A window choice offered to editors has zero length
    ZeroWindowChoice(String),
    /// The same form was given two overrides
    DuplicateOverride(ResourceId),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroWindowChoice(label) => {
                write!(f, "window choice {:?} must be greater than 0 seconds", label)
            }
            ConfigError::DuplicateOverride(id) => {
                write!(f, "duplicate override for form {}", id)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// [`ConfigSource`] that layers per-form overrides over site defaults.
#[derive(Debug, Clone)]
pub struct LayeredConfigSource {
    defaults: Arc<SiteDefaults>,
    overrides: Arc<DashMap<ResourceId, ResourceSettings, RandomState>>,
}

impl LayeredConfigSource {
    pub fn builder() -> LayeredConfigSourceBuilder {
        LayeredConfigSourceBuilder::new()
    }

    /// Source with default site settings and no overrides.
    pub fn new() -> Self {
        Self {
            defaults: Arc::new(SiteDefaults::default()),
            overrides: Arc::new(DashMap::default()),
        }
    }

    pub fn defaults(&self) -> &SiteDefaults {
        &self.defaults
    }

    /// Replace the overrides for one form.
    pub fn set_override(&self, resource: impl Into<ResourceId>, settings: ResourceSettings) {
        self.overrides.insert(resource.into(), settings);
    }

    /// Remove a form's overrides so it falls back to site defaults.
    pub fn remove_override(&self, resource: &ResourceId) -> Option<ResourceSettings> {
        self.overrides.remove(resource).map(|(_, settings)| settings)
    }
}

impl Default for LayeredConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for LayeredConfigSource {
    fn resolve(&self, resource: &ResourceId) -> Result<LimiterConfig, StoreError> {
        let config = match self.overrides.get(resource) {
            Some(settings) => settings.resolve(&self.defaults),
            None => ResourceSettings::default().resolve(&self.defaults),
        };
        Ok(config)
    }
}

/// Builder for constructing a [`LayeredConfigSource`].
#[derive(Debug, Default)]
pub struct LayeredConfigSourceBuilder {
    defaults: SiteDefaults,
    overrides: Vec<(ResourceId, ResourceSettings)>,
}

impl LayeredConfigSourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(mut self, defaults: SiteDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_override(
        mut self,
        resource: impl Into<ResourceId>,
        settings: ResourceSettings,
    ) -> Self {
        self.overrides.push((resource.into(), settings));
        self
    }

    /// Build the source.
    ///
    /// # Errors
    /// Returns `ConfigError` if a window choice is zero seconds long or a
    /// form has more than one override.
    pub fn build(self) -> Result<LayeredConfigSource, ConfigError> {
        if let Some(choice) = self.defaults.window_choices.iter().find(|c| c.secs == 0) {
            return Err(ConfigError::ZeroWindowChoice(choice.label.clone()));
        }

        let overrides = DashMap::with_capacity_and_hasher(self.overrides.len(), RandomState::new());
        for (id, settings) in self.overrides {
            if overrides.contains_key(&id) {
                return Err(ConfigError::DuplicateOverride(id));
            }
            overrides.insert(id, settings);
        }

        Ok(LayeredConfigSource {
            defaults: Arc::new(self.defaults),
            overrides: Arc::new(overrides),
        })
    }
}
