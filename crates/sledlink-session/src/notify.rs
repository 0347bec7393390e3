//! Outbound notifications for the presentation layer.
//!
//! Notifications are fire-and-forget: the coordinator never waits for the
//! presentation layer, and a dropped receiver is not an error.

use sledlink_hardware::TagData;
use tokio::sync::mpsc;
use tracing::trace;

/// Something the presentation layer should show or update.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Notification {
    /// Reader status line.
    ReaderStatus { text: String, connected: bool },

    /// A batch of tags fetched from the reader.
    TagsRead(Vec<TagData>),

    /// The handheld trigger was pressed or released.
    Trigger { pressed: bool },

    /// A decoded barcode.
    Barcode(String),

    /// A user message. Persistent messages stay until dismissed.
    Message { text: String, auto_dismiss: bool },

    /// Dismiss the current message.
    DismissMessage,

    /// Enable or disable the manual scan control.
    ScanButtonEnabled(bool),
}

/// Sending side of the notification stream.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a notifier and the matching stream.
    pub fn channel() -> (Self, Notifications) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Notifications { rx })
    }

    pub fn send(&self, notification: Notification) {
        trace!("Notify: {:?}", notification);
        // Nobody listening is fine
        let _ = self.tx.send(notification);
    }

    pub fn status(&self, text: impl Into<String>, connected: bool) {
        self.send(Notification::ReaderStatus {
            text: text.into(),
            connected,
        });
    }

    /// Transient message that disappears on its own.
    pub fn toast(&self, text: impl Into<String>) {
        self.send(Notification::Message {
            text: text.into(),
            auto_dismiss: true,
        });
    }

    /// Message that stays until dismissed.
    pub fn persistent(&self, text: impl Into<String>) {
        self.send(Notification::Message {
            text: text.into(),
            auto_dismiss: false,
        });
    }

    pub fn dismiss(&self) {
        self.send(Notification::DismissMessage);
    }
}

/// Receiving side of the notification stream.
#[derive(Debug)]
pub struct Notifications {
    rx: mpsc::UnboundedReceiver<Notification>,
}

impl Notifications {
    /// Receive the next notification.
    ///
    /// Returns `None` once the coordinator has shut down and every queued
    /// notification has been received.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.rx.recv().await
    }

    /// Receive a notification if one is queued.
    pub fn try_recv(&mut self) -> Option<Notification> {
        self.rx.try_recv().ok()
    }
}
