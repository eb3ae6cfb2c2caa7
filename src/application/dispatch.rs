//! Notification dispatch for trips and resets.
//!
//! Every transition is logged. When a valid notification address is
//! configured, one e-mail is attempted as well; delivery failures are
//! logged and swallowed.

use crate::application::metrics::Metrics;
use crate::application::ports::Notifier;
use crate::domain::{
    address::is_plausible_email_address, config::LimiterConfig, notice::Notice,
    resource::Resource,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// What happened to the e-mail leg of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailOutcome {
    /// No address configured
    NotConfigured,
    /// Address failed the syntactic check; nothing was sent
    InvalidAddress,
    /// The notifier accepted the message
    Sent,
    /// The notifier reported a delivery error
    Failed,
}

#[derive(Debug, Clone)]
pub struct NotificationDispatch {
    notifier: Arc<dyn Notifier>,
    metrics: Metrics,
}

impl NotificationDispatch {
    pub fn new(notifier: Arc<dyn Notifier>, metrics: Metrics) -> Self {
        Self { notifier, metrics }
    }

    /// Announce that `resource` was disabled (`disabled = true`) or
    /// re-enabled.
    ///
    /// Never fails: the log leg cannot fail and e-mail failures are
    /// reported through the returned outcome only.
    pub fn notify(&self, resource: &Resource, disabled: bool, config: &LimiterConfig) -> EmailOutcome {
        let notice = if disabled {
            Notice::disabled(resource.clone())
        } else {
            Notice::enabled(resource.clone())
        };

        self.notifier.log(&notice);
        self.metrics.record_notice_logged();

        let Some(address) = config.notify_address.as_deref() else {
            return EmailOutcome::NotConfigured;
        };

        if !is_plausible_email_address(address) {
            debug!(
                resource_id = %resource.id,
                address,
                "notification address is malformed, not sending e-mail"
            );
            self.metrics.record_email_skipped();
            return EmailOutcome::InvalidAddress;
        }

        match self
            .notifier
            .email(address, &notice.subject(), &notice.message())
        {
            Ok(()) => {
                self.metrics.record_email_sent();
                EmailOutcome::Sent
            }
            Err(e) => {
                warn!(
                    resource_id = %resource.id,
                    address,
                    error = %e,
                    "failed to send rate limit notification"
                );
                self.metrics.record_email_failure();
                EmailOutcome::Failed
            }
        }
    }
}
