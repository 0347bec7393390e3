//! Reader and scanner trait definitions.
//!
//! These traits are the contract between the session coordinator and the
//! vendor reader/scanner services. They mirror the SDK surface the coordinator
//! needs (discovery, lifecycle, trigger configuration, event subscription and
//! inventory actions) and nothing more.
//!
//! All methods take `&self`: a reader is shared between the serialized worker
//! and direct command callers, and the SDK handles its own internal locking.
//!
//! Methods use native `async fn` (Rust 1.90 + Edition 2024 RPITIT). Use the
//! enum wrappers in [`devices`](crate::devices) for concrete dispatch.

#![allow(async_fn_in_trait)]

use std::sync::Arc;

use crate::error::Result;
use crate::events::DeviceEventListener;
use crate::types::{
    EventSubscription, KeyLayoutType, ReaderDescriptor, ScannerInfo, TagData, Transport,
    TriggerLayout,
};

/// Trait for RFID sled readers.
///
/// # Examples
///
/// ```no_run
/// use sledlink_hardware::traits::ReaderDevice;
/// use sledlink_hardware::types::{Transport, TriggerLayout};
/// use sledlink_hardware::Result;
///
/// async fn connect_first<R: ReaderDevice>(reader: &R) -> Result<()> {
///     let readers = reader.available_readers(Transport::Bluetooth).await?;
///     if let Some(descriptor) = readers.first() {
///         reader.connect(descriptor).await?;
///         reader.set_trigger_layout(TriggerLayout::default()).await?;
///     }
///     Ok(())
/// }
/// ```
pub trait ReaderDevice: Send + Sync {
    /// List readers visible on a transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be enumerated.
    async fn available_readers(&self, transport: Transport) -> Result<Vec<ReaderDescriptor>>;

    /// Register the listener for reader appeared/disappeared notifications.
    ///
    /// Replaces any previously attached listener.
    fn attach(&self, listener: Arc<dyn DeviceEventListener>);

    /// Remove the reader appearance listener.
    fn detach(&self);

    /// Open a connection to a discovered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader refuses the connection or is gone.
    async fn connect(&self, reader: &ReaderDescriptor) -> Result<()>;

    /// Close the connection to the current reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the SDK fails to close the link cleanly.
    async fn disconnect(&self) -> Result<()>;

    /// Release the SDK handle. The device may be reconnected afterwards.
    fn dispose(&self);

    /// Whether a reader link is currently open.
    fn is_connected(&self) -> bool;

    /// Host name of the connected reader.
    fn host_name(&self) -> Option<String>;

    /// Register the listener for tag read and status events.
    ///
    /// # Errors
    ///
    /// Returns an error if no reader is connected.
    fn add_events_listener(&self, listener: Arc<dyn DeviceEventListener>) -> Result<()>;

    /// Unregister the tag read and status listener.
    fn remove_events_listener(&self);

    /// Enable or disable delivery of one event family.
    ///
    /// # Errors
    ///
    /// Returns an error if no reader is connected.
    async fn set_event_enabled(&self, kind: EventSubscription, enabled: bool) -> Result<()>;

    /// Write both trigger position assignments.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::OperationInProgress`](crate::HardwareError::OperationInProgress)
    /// if inventory is running, or another error if the write is rejected.
    async fn set_trigger_layout(&self, layout: TriggerLayout) -> Result<()>;

    /// Read the upper trigger assignment.
    async fn upper_trigger(&self) -> Result<KeyLayoutType>;

    /// Read the lower trigger assignment.
    async fn lower_trigger(&self) -> Result<KeyLayoutType>;

    /// Start inventory.
    async fn perform_inventory(&self) -> Result<()>;

    /// Stop inventory. Stopping an idle reader is not an error.
    async fn stop_inventory(&self) -> Result<()>;

    /// Drain up to `max` tags from the reader's buffer.
    async fn read_tags(&self, max: usize) -> Result<Vec<TagData>>;
}

/// Trait for the barcode scanner service paired with a sled.
pub trait ScannerDevice: Send + Sync {
    /// Register (or clear, with `None`) the scanner event listener.
    fn set_event_listener(&self, listener: Option<Arc<dyn DeviceEventListener>>);

    /// List scanners known to the scanner service.
    async fn available_scanners(&self) -> Result<Vec<ScannerInfo>>;

    /// Open a session with a scanner.
    async fn establish_session(&self, scanner_id: u32) -> Result<()>;

    /// Close a session with a scanner.
    async fn terminate_session(&self, scanner_id: u32) -> Result<()>;

    /// Fire the scanner's trigger from software.
    async fn pull_trigger(&self, scanner_id: u32) -> Result<()>;
}
