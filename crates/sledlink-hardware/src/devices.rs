//! Enum wrappers for reader and scanner dispatch.
//!
//! Native `async fn` in traits is not object-safe, so the coordinator cannot
//! hold `Arc<dyn ReaderDevice>`. These enums give it a concrete, `Send` type;
//! each backend is one variant.
//!
//! # Examples
//!
//! ```
//! use sledlink_hardware::devices::AnyReaderDevice;
//! use sledlink_hardware::mock::MockReader;
//!
//! let (reader, _handle) = MockReader::new();
//! let any_reader = AnyReaderDevice::Mock(reader);
//! ```

use std::sync::Arc;

use crate::Result;
use crate::events::DeviceEventListener;
use crate::mock::{MockReader, MockScanner};
use crate::traits::{ReaderDevice, ScannerDevice};
use crate::types::{
    EventSubscription, KeyLayoutType, ReaderDescriptor, ScannerInfo, TagData, Transport,
    TriggerLayout,
};

/// Enum wrapper for reader dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyReaderDevice {
    /// Mock reader for development and testing.
    Mock(MockReader),
}

impl ReaderDevice for AnyReaderDevice {
    async fn available_readers(&self, transport: Transport) -> Result<Vec<ReaderDescriptor>> {
        match self {
            Self::Mock(device) => device.available_readers(transport).await,
        }
    }

    fn attach(&self, listener: Arc<dyn DeviceEventListener>) {
        match self {
            Self::Mock(device) => device.attach(listener),
        }
    }

    fn detach(&self) {
        match self {
            Self::Mock(device) => device.detach(),
        }
    }

    async fn connect(&self, reader: &ReaderDescriptor) -> Result<()> {
        match self {
            Self::Mock(device) => device.connect(reader).await,
        }
    }

    async fn disconnect(&self) -> Result<()> {
        match self {
            Self::Mock(device) => device.disconnect().await,
        }
    }

    fn dispose(&self) {
        match self {
            Self::Mock(device) => device.dispose(),
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            Self::Mock(device) => device.is_connected(),
        }
    }

    fn host_name(&self) -> Option<String> {
        match self {
            Self::Mock(device) => device.host_name(),
        }
    }

    fn add_events_listener(&self, listener: Arc<dyn DeviceEventListener>) -> Result<()> {
        match self {
            Self::Mock(device) => device.add_events_listener(listener),
        }
    }

    fn remove_events_listener(&self) {
        match self {
            Self::Mock(device) => device.remove_events_listener(),
        }
    }

    async fn set_event_enabled(&self, kind: EventSubscription, enabled: bool) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_event_enabled(kind, enabled).await,
        }
    }

    async fn set_trigger_layout(&self, layout: TriggerLayout) -> Result<()> {
        match self {
            Self::Mock(device) => device.set_trigger_layout(layout).await,
        }
    }

    async fn upper_trigger(&self) -> Result<KeyLayoutType> {
        match self {
            Self::Mock(device) => device.upper_trigger().await,
        }
    }

    async fn lower_trigger(&self) -> Result<KeyLayoutType> {
        match self {
            Self::Mock(device) => device.lower_trigger().await,
        }
    }

    async fn perform_inventory(&self) -> Result<()> {
        match self {
            Self::Mock(device) => device.perform_inventory().await,
        }
    }

    async fn stop_inventory(&self) -> Result<()> {
        match self {
            Self::Mock(device) => device.stop_inventory().await,
        }
    }

    async fn read_tags(&self, max: usize) -> Result<Vec<TagData>> {
        match self {
            Self::Mock(device) => device.read_tags(max).await,
        }
    }
}

/// Enum wrapper for scanner dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyScannerDevice {
    /// Mock scanner for development and testing.
    Mock(MockScanner),
}

impl ScannerDevice for AnyScannerDevice {
    fn set_event_listener(&self, listener: Option<Arc<dyn DeviceEventListener>>) {
        match self {
            Self::Mock(device) => device.set_event_listener(listener),
        }
    }

    async fn available_scanners(&self) -> Result<Vec<ScannerInfo>> {
        match self {
            Self::Mock(device) => device.available_scanners().await,
        }
    }

    async fn establish_session(&self, scanner_id: u32) -> Result<()> {
        match self {
            Self::Mock(device) => device.establish_session(scanner_id).await,
        }
    }

    async fn terminate_session(&self, scanner_id: u32) -> Result<()> {
        match self {
            Self::Mock(device) => device.terminate_session(scanner_id).await,
        }
    }

    async fn pull_trigger(&self, scanner_id: u32) -> Result<()> {
        match self {
            Self::Mock(device) => device.pull_trigger(scanner_id).await,
        }
    }
}
