//! User notifications emitted by the session coordinator.

use alloy::primitives::Address;

/// A titled message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Presentation layer for notifications. Fire-and-forget.
pub trait NotificationSink: Send + Sync {
    fn notify_error(&self, notification: Notification);
    fn notify_success(&self, notification: Notification);
}

/// Sink that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify_error(&self, notification: Notification) {
        tracing::error!(title = %notification.title, "{}", notification.message);
    }

    fn notify_success(&self, notification: Notification) {
        tracing::info!(title = %notification.title, "{}", notification.message);
    }
}

/// `0x1234...abcd` form of an address.
pub fn ellipsed(address: Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}
