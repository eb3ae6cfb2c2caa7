//! Recording notifier and mail transport for testing.

use crate::application::error::DeliveryError;
use crate::application::ports::{Email, MailTransport, Notifier};
use crate::domain::notice::Notice;
use std::sync::{Arc, Mutex};

const POISONED: &str = "mock mutex poisoned - a test thread panicked while holding the lock";

/// Notifier that records every notice and e-mail attempt.
///
/// Built with [`RecordingNotifier::failing`], every e-mail attempt is
/// recorded and then rejected with a transport error.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    logged: Arc<Mutex<Vec<Notice>>>,
    emails: Arc<Mutex<Vec<Email>>>,
    fail_email: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose e-mail leg always fails.
    pub fn failing() -> Self {
        Self {
            fail_email: true,
            ..Self::default()
        }
    }

    pub fn logged(&self) -> Vec<Notice> {
        self.logged.lock().expect(POISONED).clone()
    }

    /// All e-mail attempts, including failed ones.
    pub fn emails(&self) -> Vec<Email> {
        self.emails.lock().expect(POISONED).clone()
    }

    pub fn email_attempts(&self) -> usize {
        self.emails.lock().expect(POISONED).len()
    }
}

impl Notifier for RecordingNotifier {
    fn log(&self, notice: &Notice) {
        self.logged.lock().expect(POISONED).push(notice.clone());
    }

    fn email(&self, address: &str, subject: &str, body: &str) -> Result<(), DeliveryError> {
        self.emails.lock().expect(POISONED).push(Email {
            to: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if self.fail_email {
            Err(DeliveryError::Transport("mock transport failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Mail transport that records sent messages, optionally failing.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
    failure: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport that rejects every message with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    /// Messages accepted by the transport.
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().expect(POISONED).clone()
    }
}

impl MailTransport for RecordingMailer {
    fn send(&self, email: &Email) -> Result<(), DeliveryError> {
        if let Some(reason) = &self.failure {
            return Err(DeliveryError::Transport(reason.clone()));
        }
        self.sent.lock().expect(POISONED).push(email.clone());
        Ok(())
    }
}
