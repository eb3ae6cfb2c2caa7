//! Notifier backed by `tracing` and an optional mail transport.

use crate::application::error::DeliveryError;
use crate::application::ports::{Email, MailTransport, Notifier};
use crate::domain::notice::Notice;
use std::sync::Arc;
use tracing::warn;

/// Logs notices as `WARN` events and forwards e-mail to a [`MailTransport`].
///
/// Without a transport, every e-mail attempt fails with
/// `DeliveryError::NoTransport`, which the dispatcher logs and ignores.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier {
    transport: Option<Arc<dyn MailTransport>>,
}

impl TracingNotifier {
    /// Log-only notifier.
    pub fn new() -> Self {
        Self { transport: None }
    }

    pub fn with_transport(transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }
}

impl Notifier for TracingNotifier {
    fn log(&self, notice: &Notice) {
        warn!(
            resource_id = %notice.resource.id,
            title = %notice.resource.title,
            disabled = notice.disabled,
            cause = notice.cause(),
            "{}",
            notice.message()
        );
    }

    fn email(&self, address: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        let transport = self.transport.as_ref().ok_or(DeliveryError::NoTransport)?;
        transport.send(&Email {
            to: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        })
    }
}
