//! Session coordinator for a handheld RFID sled and its barcode scanner.
//!
//! The coordinator owns the reader connection lifecycle, routes device
//! callbacks, serializes every trigger layout write, and runs the scan-test
//! handoff between RFID inventory and the barcode scanner.
//!
//! # Concurrency Model
//!
//! - **Callbacks never block**: the [`EventDispatcher`] only touches atomics
//!   and queues work.
//! - **One worker**: a single tokio task performs every connect, disconnect,
//!   inventory and handoff step in arrival order.
//! - **One writer**: the [`TriggerModeController`] holds an async mutex across
//!   each trigger layout write.
//!
//! See [`coordinator`] for the component diagram and a full example.
//!
//! [`EventDispatcher`]: dispatcher::EventDispatcher
//! [`TriggerModeController`]: trigger::TriggerModeController

pub mod config;
pub mod connection;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod messages;
pub mod notify;
pub mod orchestrator;
pub mod readiness;
pub mod state;
pub mod trigger;
mod worker;

pub use config::SessionConfig;
pub use connection::{DeviceSession, ScannerSession};
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use messages::UserMessages;
pub use notify::{Notification, Notifications, Notifier};
pub use readiness::{Readiness, ReadinessGate};
pub use state::SharedState;
pub use trigger::{TriggerModeController, layout_for};
