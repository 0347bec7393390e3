//! Device abstraction layer for handheld RFID sleds.
//!
//! This crate defines the contract between the session coordinator and the
//! vendor reader/scanner services, plus programmable mock devices for
//! development and testing.
//!
//! # Design Philosophy
//!
//! - **Async-first**: device calls use native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: [`AnyReaderDevice`] and [`AnyScannerDevice`] give the
//!   coordinator concrete `Send` types instead of trait objects.
//! - **Callback events**: the SDK reports everything through a synchronous
//!   [`DeviceEventListener`] receiving a single [`DeviceEvent`] union.
//! - **Error-aware**: every fallible call returns [`Result<T>`] with a
//!   [`HardwareError`].
//!
//! # Example
//!
//! ```
//! use sledlink_hardware::mock::MockReader;
//! use sledlink_hardware::traits::ReaderDevice;
//! use sledlink_hardware::types::{KeyLayoutType, ReaderDescriptor, Transport, TriggerLayout};
//!
//! #[tokio::main]
//! async fn main() -> sledlink_hardware::Result<()> {
//!     let (reader, handle) = MockReader::new();
//!     let sled = ReaderDescriptor::new("RFD4031-G10B700-WR", Transport::ServiceUsb);
//!     handle.add_reader(sled.clone());
//!
//!     reader.connect(&sled).await?;
//!     reader
//!         .set_trigger_layout(TriggerLayout::uniform(KeyLayoutType::SledScan))
//!         .await?;
//!     assert_eq!(reader.lower_trigger().await?, KeyLayoutType::SledScan);
//!     Ok(())
//! }
//! ```
//!
//! [`AnyReaderDevice`]: devices::AnyReaderDevice
//! [`AnyScannerDevice`]: devices::AnyScannerDevice

pub mod devices;
pub mod error;
pub mod events;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyReaderDevice, AnyScannerDevice};
pub use error::{HardwareError, Result};
pub use events::{DeviceEvent, DeviceEventListener, ScannerEvent, StatusEvent, TriggerAction};
pub use traits::{ReaderDevice, ScannerDevice};
pub use types::{
    EventSubscription, KeyLayoutType, ReaderDescriptor, ScannerInfo, TagData, Transport,
    TriggerLayout,
};
