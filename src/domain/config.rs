//! Rate limit configuration.
//!
//! Configuration comes in two layers: process-wide [`SiteDefaults`] and
//! optional per-form [`ResourceSettings`]. Resolving the two produces the
//! effective [`LimiterConfig`] the evaluator consumes.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of submissions allowed inside one window.
pub const DEFAULT_THRESHOLD: u64 = 60;

/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Message shown in place of a disabled form.
pub const DEFAULT_DISABLED_MESSAGE: &str =
    "This form is temporarily disabled. Please try again later.";

/// Effective rate limit configuration for one protected form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterConfig {
    /// Whether limiting is switched on for this form
    pub enabled: bool,
    /// Submission volume that must be exceeded to trip
    pub threshold: u64,
    /// Trailing window over which submissions are counted
    pub window: Duration,
    /// Whether a tripped form may re-enable itself after a cooldown
    pub auto_reset: bool,
    /// Where trip and reset notices are e-mailed, if anywhere
    pub notify_address: Option<String>,
    /// Text substituted for the form while it is disabled
    pub disabled_message: String,
}

impl LimiterConfig {
    /// Create an enabled config with the given threshold and window.
    pub fn new(threshold: u64, window: Duration) -> Self {
        Self {
            enabled: true,
            threshold,
            window,
            auto_reset: true,
            notify_address: None,
            disabled_message: DEFAULT_DISABLED_MESSAGE.to_string(),
        }
    }

    /// A config that never limits.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_auto_reset(mut self, auto_reset: bool) -> Self {
        self.auto_reset = auto_reset;
        self
    }

    pub fn with_notify_address(mut self, address: impl Into<String>) -> Self {
        self.notify_address = Some(address.into());
        self
    }

    pub fn with_disabled_message(mut self, message: impl Into<String>) -> Self {
        self.disabled_message = message.into();
        self
    }

    /// Whether limiting has any effect.
    ///
    /// A zero threshold or a zero window makes the limiter inert even when
    /// `enabled` is set.
    pub fn is_active(&self) -> bool {
        self.enabled && self.threshold > 0 && !self.window.is_zero()
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, Duration::from_secs(DEFAULT_WINDOW_SECS))
    }
}

/// One selectable window length offered to editors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowChoice {
    pub secs: u64,
    pub label: String,
}

impl WindowChoice {
    pub fn new(secs: u64, label: impl Into<String>) -> Self {
        Self {
            secs,
            label: label.into(),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.secs)
    }
}

fn default_window_choices() -> Vec<WindowChoice> {
    vec![
        WindowChoice::new(60, "per minute"),
        WindowChoice::new(30, "per 30 seconds"),
    ]
}

/// Process-wide defaults, constructed once at startup and read-only after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteDefaults {
    /// Master switch: when off, no form is ever limited
    pub rate_limiting_enabled: bool,
    /// Whether tripped forms re-enable themselves after a cooldown
    pub reset_automatically: bool,
    pub default_threshold: u64,
    pub default_window_secs: u64,
    pub default_disabled_message: String,
    pub notification_address: Option<String>,
    pub window_choices: Vec<WindowChoice>,
}

impl SiteDefaults {
    pub fn default_window(&self) -> Duration {
        Duration::from_secs(self.default_window_secs)
    }

    /// Label for a window length, if it is one of the offered choices.
    pub fn window_label(&self, window: Duration) -> Option<&str> {
        self.window_choices
            .iter()
            .find(|choice| choice.window() == window)
            .map(|choice| choice.label.as_str())
    }
}

impl Default for SiteDefaults {
    fn default() -> Self {
        Self {
            rate_limiting_enabled: true,
            reset_automatically: true,
            default_threshold: DEFAULT_THRESHOLD,
            default_window_secs: DEFAULT_WINDOW_SECS,
            default_disabled_message: DEFAULT_DISABLED_MESSAGE.to_string(),
            notification_address: None,
            window_choices: default_window_choices(),
        }
    }
}

/// Per-form overrides. Any field left unset falls back to [`SiteDefaults`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    pub enabled: bool,
    pub threshold: Option<u64>,
    pub window_secs: Option<u64>,
    pub disabled_message: Option<String>,
    pub notify_address: Option<String>,
}

impl ResourceSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window_secs = Some(window.as_secs());
        self
    }

    pub fn with_disabled_message(mut self, message: impl Into<String>) -> Self {
        self.disabled_message = Some(message.into());
        self
    }

    pub fn with_notify_address(mut self, address: impl Into<String>) -> Self {
        self.notify_address = Some(address.into());
        self
    }

    /// Merge these overrides over `defaults`.
    pub fn resolve(&self, defaults: &SiteDefaults) -> LimiterConfig {
        LimiterConfig {
            enabled: defaults.rate_limiting_enabled && self.enabled,
            threshold: self.threshold.unwrap_or(defaults.default_threshold),
            window: Duration::from_secs(
                self.window_secs.unwrap_or(defaults.default_window_secs),
            ),
            auto_reset: defaults.reset_automatically,
            notify_address: self
                .notify_address
                .clone()
                .or_else(|| defaults.notification_address.clone()),
            disabled_message: self
                .disabled_message
                .clone()
                .unwrap_or_else(|| defaults.default_disabled_message.clone()),
        }
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: None,
            window_secs: None,
            disabled_message: None,
            notify_address: None,
        }
    }
}
