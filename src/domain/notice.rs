//! Human-readable notices about trips and resets.

use crate::domain::resource::Resource;
use serde::{Deserialize, Serialize};

/// A trip or reset notice for one form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub resource: Resource,
    /// `true` when the form was disabled, `false` when it was re-enabled
    pub disabled: bool,
}

impl Notice {
    pub fn disabled(resource: Resource) -> Self {
        Self {
            resource,
            disabled: true,
        }
    }

    pub fn enabled(resource: Resource) -> Self {
        Self {
            resource,
            disabled: false,
        }
    }

    /// Short cause tag, suitable for a structured log field.
    pub fn cause(&self) -> &'static str {
        if self.disabled {
            "rate limit reached"
        } else {
            "rate limit lifted"
        }
    }

    pub fn message(&self) -> String {
        if self.disabled {
            format!(
                "Form {} has been disabled after the submission rate limit has been reached.",
                self.resource
            )
        } else {
            format!(
                "Form {} has been enabled after the submission rate limit has been lifted.",
                self.resource
            )
        }
    }

    pub fn subject(&self) -> String {
        if self.disabled {
            format!("Form disabled: {}", self.resource.title)
        } else {
            format!("Form re-enabled: {}", self.resource.title)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_message() {
        let notice = Notice::disabled(Resource::new(7u64, "Newsletter signup"));
        assert_eq!(
            notice.message(),
            "Form Newsletter signup (7) has been disabled after the submission rate limit has been reached."
        );
        assert_eq!(notice.cause(), "rate limit reached");
        assert_eq!(notice.subject(), "Form disabled: Newsletter signup");
    }

    #[test]
    fn test_enabled_message() {
        let notice = Notice::enabled(Resource::new(7u64, "Newsletter signup"));
        assert_eq!(
            notice.message(),
            "Form Newsletter signup (7) has been enabled after the submission rate limit has been lifted."
        );
        assert_eq!(notice.cause(), "rate limit lifted");
    }
}
