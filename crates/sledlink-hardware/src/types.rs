//! Common types shared across reader and scanner implementations.
//!
//! This module defines the data exchanged with the reader SDK: discovery
//! descriptors, trigger key layouts, tag reads and event subscription kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport channel used to discover readers.
///
/// Discovery walks an ordered list of transports and stops at the first one
/// that reports at least one reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Reader exposed by the host's RFID service over USB.
    ServiceUsb,

    /// Reader attached to the terminal's serial rail.
    ReSerial,

    /// Reader attached to the terminal's USB rail.
    ReUsb,

    /// Bluetooth-paired reader.
    Bluetooth,

    /// Every transport the SDK knows about.
    All,
}

impl Transport {
    /// Default discovery order.
    pub const DEFAULT_ORDER: [Transport; 5] = [
        Self::ServiceUsb,
        Self::ReSerial,
        Self::ReUsb,
        Self::Bluetooth,
        Self::All,
    ];
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceUsb => write!(f, "SERVICE_USB"),
            Self::ReSerial => write!(f, "RE_SERIAL"),
            Self::ReUsb => write!(f, "RE_USB"),
            Self::Bluetooth => write!(f, "BLUETOOTH"),
            Self::All => write!(f, "ALL"),
        }
    }
}

/// A reader reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderDescriptor {
    /// Reader name, which is also its host name once connected.
    pub name: String,

    /// Optional transport address (MAC, device path).
    pub address: Option<String>,

    /// Transport the reader was found on.
    pub transport: Transport,
}

impl ReaderDescriptor {
    /// Create a new ReaderDescriptor.
    pub fn new(name: impl Into<String>, transport: Transport) -> Self {
        Self {
            name: name.into(),
            address: None,
            transport,
        }
    }

    /// Set the transport address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// A barcode scanner reported by the scanner SDK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerInfo {
    /// SDK-assigned scanner identifier.
    pub scanner_id: u32,

    /// Scanner name. A sled's scan engine carries the reader host name.
    pub name: String,
}

impl ScannerInfo {
    /// Create a new ScannerInfo.
    pub fn new(scanner_id: u32, name: impl Into<String>) -> Self {
        Self {
            scanner_id,
            name: name.into(),
        }
    }
}

/// Function assigned to a physical trigger position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum KeyLayoutType {
    /// Trigger drives RFID inventory.
    Rfid,

    /// Trigger fires the sled's scan engine.
    SledScan,

    /// Trigger fires the host terminal's scan engine.
    TerminalScan,

    /// Trigger does nothing.
    NoAction,
}

impl fmt::Display for KeyLayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rfid => write!(f, "RFID"),
            Self::SledScan => write!(f, "SLED_SCAN"),
            Self::TerminalScan => write!(f, "TERMINAL_SCAN"),
            Self::NoAction => write!(f, "NO_ACTION"),
        }
    }
}

/// Assignment of both trigger positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerLayout {
    /// Upper trigger position.
    pub upper: KeyLayoutType,

    /// Lower trigger position.
    pub lower: KeyLayoutType,
}

impl TriggerLayout {
    /// Idle default: upper trigger runs inventory, lower trigger scans.
    pub const DEFAULT: TriggerLayout = TriggerLayout {
        upper: KeyLayoutType::Rfid,
        lower: KeyLayoutType::SledScan,
    };

    /// Create a layout with explicit assignments.
    pub fn new(upper: KeyLayoutType, lower: KeyLayoutType) -> Self {
        Self { upper, lower }
    }

    /// Create a layout assigning both positions to the same function.
    pub fn uniform(layout: KeyLayoutType) -> Self {
        Self::new(layout, layout)
    }
}

impl Default for TriggerLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for TriggerLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upper={}, lower={}", self.upper, self.lower)
    }
}

/// A tag read by the RFID engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagData {
    /// Tag identifier (EPC, hex encoded).
    pub tag_id: String,

    /// Peak RSSI in dBm.
    pub peak_rssi: i16,

    /// Antenna that produced the read.
    pub antenna_id: u16,

    /// When the tag was read.
    pub timestamp: DateTime<Utc>,
}

impl TagData {
    /// Create a tag read on antenna 1 with the current timestamp.
    pub fn new(tag_id: impl Into<String>, peak_rssi: i16) -> Self {
        Self {
            tag_id: tag_id.into(),
            peak_rssi,
            antenna_id: 1,
            timestamp: Utc::now(),
        }
    }

    /// Set the antenna id.
    pub fn with_antenna(mut self, antenna_id: u16) -> Self {
        self.antenna_id = antenna_id;
        self
    }
}

/// Reader event families that can be enabled or disabled individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSubscription {
    /// Handheld trigger press/release.
    HandheldTrigger,

    /// Tag read notifications.
    TagRead,

    /// Inventory start and stop notifications.
    InventoryStartStop,

    /// Reader disconnection notifications.
    ReaderDisconnect,

    /// Operation end summary notifications.
    OperationEndSummary,
}

impl EventSubscription {
    /// Every subscription the coordinator enables on connect.
    pub const ALL: [EventSubscription; 5] = [
        Self::HandheldTrigger,
        Self::TagRead,
        Self::ReaderDisconnect,
        Self::InventoryStartStop,
        Self::OperationEndSummary,
    ];
}
