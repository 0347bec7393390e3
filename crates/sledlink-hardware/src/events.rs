//! Device event types and the listener contract.
//!
//! The reader SDK reports tag reads, status changes, reader (dis)appearance and
//! scanner activity through several listener interfaces. This crate folds them
//! into one tagged union, [`DeviceEvent`], delivered through a single
//! [`DeviceEventListener`].
//!
//! Listeners are invoked synchronously on a context owned by the device (the
//! SDK callback thread for real hardware, the caller of the mock handle for
//! [`MockReader`](crate::mock::MockReader)). Implementations must return
//! quickly and must not block.

use crate::types::{ReaderDescriptor, ScannerInfo};

/// Trigger position change reported by a `HANDHELD_TRIGGER` status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAction {
    Pressed,
    Released,
}

/// Status notification from a connected reader.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StatusEvent {
    /// The handheld trigger was pressed or released.
    HandheldTrigger(TriggerAction),

    /// The reader link dropped.
    Disconnection,

    /// An inventory operation started.
    InventoryStart,

    /// An inventory operation stopped.
    InventoryStop,

    /// Summary sent by the reader at the end of an operation.
    OperationEndSummary {
        total_rounds: u32,
        total_tags: u32,
        duration_ms: u64,
    },

    /// Status type this crate does not model.
    Other(String),
}

impl StatusEvent {
    /// SDK-style name of the status type, used in logs.
    pub fn kind(&self) -> &str {
        match self {
            Self::HandheldTrigger(_) => "HANDHELD_TRIGGER_EVENT",
            Self::Disconnection => "DISCONNECTION_EVENT",
            Self::InventoryStart => "INVENTORY_START_EVENT",
            Self::InventoryStop => "INVENTORY_STOP_EVENT",
            Self::OperationEndSummary { .. } => "OPERATION_END_SUMMARY_EVENT",
            Self::Other(kind) => kind,
        }
    }
}

/// Notification from the barcode scanner SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScannerEvent {
    /// A scanner became available.
    Appeared(ScannerInfo),

    /// A scanner went away.
    Disappeared(u32),

    /// A communication session with a scanner was established.
    SessionEstablished(ScannerInfo),

    /// A communication session with a scanner ended.
    SessionTerminated(u32),

    /// A barcode was decoded.
    Barcode {
        data: String,
        symbology: Option<String>,
        scanner_id: u32,
    },
}

/// Every event a device can report to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeviceEvent {
    /// Tags are waiting in the reader's buffer.
    TagsRead,

    /// A reader status notification.
    Status(StatusEvent),

    /// A reader showed up on one of the transports.
    ReaderAppeared(ReaderDescriptor),

    /// A previously discovered reader went away.
    ReaderDisappeared(ReaderDescriptor),

    /// A barcode scanner notification.
    Scanner(ScannerEvent),
}

/// Receiver for device events.
///
/// This trait is object-safe so devices can hold `Arc<dyn DeviceEventListener>`.
pub trait DeviceEventListener: Send + Sync {
    /// Handle one event. Must not block.
    fn on_event(&self, event: DeviceEvent);
}
