//! Shared rig for coordinator integration tests.
//!
//! Every test runs on a paused clock (`start_paused = true`), so waits that
//! go through tokio timers complete as soon as the runtime is idle.

#![allow(dead_code)]

use std::time::Duration;

use sledlink_core::ConnectionState;
use sledlink_hardware::mock::{MockReader, MockReaderHandle, MockScanner, MockScannerHandle};
use sledlink_hardware::{AnyReaderDevice, AnyScannerDevice, ReaderDescriptor, ScannerInfo, Transport};
use sledlink_session::{Coordinator, CoordinatorHandle, Notification, Notifications, SessionConfig};

/// Name of the preferred sled.
pub const SLED: &str = "RFD4031-G10B700-WR";

/// Scanner id of the sled's scan engine.
pub const SCANNER_ID: u32 = 1;

pub fn sled() -> ReaderDescriptor {
    ReaderDescriptor::new(SLED, Transport::ServiceUsb)
}

pub fn sled_scanner() -> ScannerInfo {
    ScannerInfo::new(SCANNER_ID, format!("{} scanner", SLED))
}

/// Mock devices plus their control handles, before the coordinator starts.
pub struct Devices {
    pub reader: MockReader,
    pub reader_handle: MockReaderHandle,
    pub scanner: MockScanner,
    pub scanner_handle: MockScannerHandle,
}

/// No reader or scanner is discoverable.
pub fn bare_devices() -> Devices {
    let (reader, reader_handle) = MockReader::new();
    let (scanner, scanner_handle) = MockScanner::new();
    Devices {
        reader,
        reader_handle,
        scanner,
        scanner_handle,
    }
}

/// The sled and its paired scanner are discoverable.
pub fn devices() -> Devices {
    let devices = bare_devices();
    devices.reader_handle.add_reader(sled());
    devices.scanner_handle.add_scanner(sled_scanner());
    devices
}

pub struct Rig {
    pub handle: CoordinatorHandle,
    pub notifications: Notifications,
    pub reader: MockReaderHandle,
    pub scanner: MockScannerHandle,
}

impl Rig {
    pub fn start(devices: Devices) -> Self {
        Self::start_with(SessionConfig::default(), devices)
    }

    pub fn start_with(config: SessionConfig, devices: Devices) -> Self {
        let coordinator = Coordinator::new(
            config,
            AnyReaderDevice::Mock(devices.reader),
            AnyScannerDevice::Mock(devices.scanner),
        )
        .expect("valid config");
        let (handle, notifications) = coordinator.start();

        Self {
            handle,
            notifications,
            reader: devices.reader_handle,
            scanner: devices.scanner_handle,
        }
    }

    /// Start with the sled present, wait for the session to come up and
    /// forget everything that happened on the way.
    pub async fn connected() -> Self {
        let mut rig = Self::start(devices());
        rig.wait_for_state(ConnectionState::Connected).await;
        rig.settle().await;
        rig.drain();
        rig.reader.clear_calls();
        rig
    }

    pub async fn wait_for_state(&self, target: ConnectionState) {
        let mut states = self.handle.connection_states();
        tokio::time::timeout(Duration::from_secs(30), states.wait_for(|s| *s == target))
            .await
            .expect("connection state reached in time")
            .map(|_| ())
            .expect("coordinator alive");
    }

    /// Let the worker finish everything it can do without a timer.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::iter::from_fn(|| self.notifications.try_recv()).collect()
    }
}

pub fn status_texts(notifications: &[Notification]) -> Vec<String> {
    notifications
        .iter()
        .filter_map(|n| match n {
            Notification::ReaderStatus { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn message_texts(notifications: &[Notification]) -> Vec<String> {
    notifications
        .iter()
        .filter_map(|n| match n {
            Notification::Message { text, .. } => Some(text.clone()),
            _ => None,
        })
        .collect()
}
