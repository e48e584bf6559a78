use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
}

/// A short-lived message for the user, rendered as a toast by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Info,
        }
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            severity: Severity::Warning,
        }
    }
}

/// Fire-and-forget outlet for user-facing messages.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs every notification and fans it out to websocket subscribers.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(tx: broadcast::Sender<Notification>) -> Self {
        Self { tx }
    }
}

impl NotificationSink for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => info!(
                title = %notification.title,
                body = %notification.body,
                "notification"
            ),
            Severity::Warning => warn!(
                title = %notification.title,
                body = %notification.body,
                "notification"
            ),
        }

        // No subscribers is fine.
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::{BroadcastNotifier, Notification, NotificationSink, Severity};

    #[test]
    fn notifications_reach_subscribers() {
        let (tx, mut rx) = broadcast::channel(8);
        let notifier = BroadcastNotifier::new(tx);

        notifier.notify(Notification::warning("Set both points", "Pickup is missing"));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.severity, Severity::Warning);
        assert_eq!(received.title, "Set both points");
    }

    #[test]
    fn notify_without_subscribers_does_not_fail() {
        let (tx, rx) = broadcast::channel(8);
        drop(rx);
        BroadcastNotifier::new(tx).notify(Notification::info("Order accepted", ""));
    }
}
