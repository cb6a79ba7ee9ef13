//! Transient user-facing notifications
//!
//! The screen reports every outcome the user should see through a
//! [`Notifier`]. The receiving side may be gone (the view was torn down while
//! a request was still in flight); such notifications are dropped silently.

use tokio::sync::mpsc;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation succeeded
    Success,
    /// Expected, benign refusal (e.g. a delete is already running)
    Notice,
    /// Operation failed; the screen stays usable
    Error,
    /// The screen cannot be used for the rest of the session
    Fatal,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Short heading
    pub title: String,
    /// Body text
    pub message: String,
}

impl Notification {
    fn new(level: NotificationLevel, title: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.to_string(),
            message: message.into(),
        }
    }

    /// A success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, "Success", message)
    }

    /// A benign notice
    pub fn notice(title: &str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Notice, title, message)
    }

    /// A recoverable error
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, "Error", message)
    }

    /// A session-blocking error
    pub fn fatal(title: &str, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Fatal, title, message)
    }
}

/// Sending half of the notification channel
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a notifier and the receiver the view reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver `notification`; a no-op once the view has gone away
    pub fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::trace!("Notification dropped: view is gone");
        }
    }
}
