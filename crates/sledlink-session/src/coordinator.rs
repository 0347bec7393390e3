//! Public entry point tying the session components together.
//!
//! # Architecture
//!
//! ```text
//!  Reader / scanner SDK callbacks        User commands
//!             │                               │
//!             ▼                               ▼
//!     ┌───────────────┐   WorkerTask   ┌──────────────────┐
//!     │ EventDispatcher├──────────────►│  Session worker  │◄── CoordinatorHandle
//!     └──────┬────────┘   (mpsc)       │ ConnectionManager│
//!            │ atomics                 │ ScanOrchestrator │
//!            ▼                         └────────┬─────────┘
//!       SharedState ◄──── ReadinessGate ◄── TriggerModeController ◄── CoordinatorHandle
//!                                               │
//!                                               ▼
//!                                         Notifications
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use sledlink_hardware::mock::{MockReader, MockScanner};
//! use sledlink_hardware::{AnyReaderDevice, AnyScannerDevice};
//! use sledlink_session::{Coordinator, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> sledlink_core::Result<()> {
//!     let (reader, _reader_handle) = MockReader::new();
//!     let (scanner, _scanner_handle) = MockScanner::new();
//!
//!     let coordinator = Coordinator::new(
//!         SessionConfig::default(),
//!         AnyReaderDevice::Mock(reader),
//!         AnyScannerDevice::Mock(scanner),
//!     )?;
//!     let (handle, mut notifications) = coordinator.start();
//!
//!     while let Some(notification) = notifications.recv().await {
//!         println!("{:?}", notification);
//!     }
//!
//!     handle.shutdown().await
//! }
//! ```

use std::sync::Arc;

use sledlink_core::{ConnectionState, Error, Result, TriggerMode};
use sledlink_hardware::{
    AnyReaderDevice, AnyScannerDevice, DeviceEventListener, ReaderDevice, ScannerDevice,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::SessionConfig;
use crate::connection::ConnectionManager;
use crate::dispatcher::EventDispatcher;
use crate::messages::UserMessages;
use crate::notify::{Notifications, Notifier};
use crate::orchestrator::ScanOrchestrator;
use crate::readiness::ReadinessGate;
use crate::state::SharedState;
use crate::trigger::TriggerModeController;
use crate::worker::{Worker, WorkerTask};

/// Session coordinator for one reader and its paired scanner.
#[derive(Debug)]
pub struct Coordinator {
    config: SessionConfig,
    reader: AnyReaderDevice,
    scanner: AnyScannerDevice,
}

impl Coordinator {
    /// Create a coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(
        config: SessionConfig,
        reader: AnyReaderDevice,
        scanner: AnyScannerDevice,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reader,
            scanner,
        })
    }

    /// Attach the device listeners, spawn the session worker and queue the
    /// initial connect.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> (CoordinatorHandle, Notifications) {
        let config = Arc::new(self.config);
        let reader = Arc::new(self.reader);
        let scanner = Arc::new(self.scanner);
        let state = Arc::new(SharedState::new());

        let (notifier, notifications) = Notifier::channel();
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);

        let gate = ReadinessGate::new(
            Arc::clone(&state),
            config.idle_poll_attempts,
            config.idle_poll_interval(),
        );
        let trigger = Arc::new(TriggerModeController::new(
            Arc::clone(&reader),
            Arc::clone(&state),
            gate,
            notifier.clone(),
        ));

        let dispatcher: Arc<dyn DeviceEventListener> = Arc::new(EventDispatcher::new(
            Arc::clone(&state),
            notifier.clone(),
            task_tx.clone(),
        ));
        reader.attach(Arc::clone(&dispatcher));
        scanner.set_event_listener(Some(Arc::clone(&dispatcher)));

        let connection = ConnectionManager::new(
            Arc::clone(&config),
            Arc::clone(&reader),
            Arc::clone(&scanner),
            Arc::clone(&state),
            Arc::clone(&trigger),
            notifier.clone(),
            dispatcher,
            state_tx,
        );
        let orchestrator =
            ScanOrchestrator::new(Arc::clone(&trigger), Arc::clone(&state), notifier.clone());
        let worker = Worker::new(
            connection,
            orchestrator,
            Arc::clone(&reader),
            scanner,
            Arc::clone(&state),
            notifier.clone(),
            config.tag_batch_size,
            task_rx,
        );

        // Receiver is alive, the send cannot fail
        let _ = task_tx.send(WorkerTask::Connect);
        let worker = tokio::spawn(worker.run());
        info!("Session coordinator started");

        let handle = CoordinatorHandle {
            tasks: task_tx,
            state,
            trigger,
            connection: state_rx,
            notifier,
            reader,
            worker,
        };
        (handle, notifications)
    }
}

/// Command handle for a running coordinator.
///
/// Lifecycle and inventory commands are queued for the session worker and
/// return once queued. Trigger mode commands run directly and return the
/// outcome of the hardware write.
#[derive(Debug)]
pub struct CoordinatorHandle {
    tasks: mpsc::UnboundedSender<WorkerTask>,
    state: Arc<SharedState>,
    trigger: Arc<TriggerModeController>,
    connection: watch::Receiver<ConnectionState>,
    notifier: Notifier,
    reader: Arc<AnyReaderDevice>,
    worker: JoinHandle<()>,
}

impl CoordinatorHandle {
    fn submit(&self, task: WorkerTask) -> Result<()> {
        self.tasks.send(task).map_err(|_| Error::ShuttingDown)
    }

    /// Connect to a reader, or republish the status if already connected.
    pub fn connect(&self) -> Result<()> {
        self.submit(WorkerTask::Connect)
    }

    /// Foreground lifecycle hook. Same as [`connect`](Self::connect).
    pub fn resume(&self) -> Result<()> {
        self.connect()
    }

    /// Tear down the current session. Does nothing when disconnected.
    pub fn disconnect(&self) -> Result<()> {
        self.submit(WorkerTask::Disconnect)
    }

    /// Background lifecycle hook. Same as [`disconnect`](Self::disconnect).
    pub fn pause(&self) -> Result<()> {
        self.disconnect()
    }

    pub fn toggle_connection(&self) -> Result<()> {
        if self.is_connected() {
            self.disconnect()
        } else {
            self.connect()
        }
    }

    /// Start inventory, as if the trigger was pressed.
    pub fn start_inventory(&self) -> Result<()> {
        self.submit(WorkerTask::StartInventory)
    }

    pub fn stop_inventory(&self) -> Result<()> {
        self.submit(WorkerTask::StopInventory)
    }

    /// Fire the paired scanner from software.
    ///
    /// # Errors
    ///
    /// Rejected with [`Error::NotConnected`] or [`Error::DeviceBusy`] when the
    /// reader is not connected or is running inventory.
    pub fn scan_code(&self) -> Result<()> {
        if !self.is_connected() {
            self.notifier.toast(UserMessages::SKIP_NOT_CONNECTED);
            return Err(Error::NotConnected);
        }
        if self.state.is_busy() {
            self.notifier.toast(UserMessages::SKIP_RFID_BUSY);
            return Err(Error::DeviceBusy("inventory running".into()));
        }
        self.submit(WorkerTask::PullScannerTrigger)
    }

    /// Route the trigger to RFID or Barcode.
    ///
    /// See [`TriggerModeController::set_trigger_mode`].
    pub async fn set_trigger_mode(&self, mode: TriggerMode) -> Result<()> {
        self.trigger.set_trigger_mode(mode).await
    }

    /// Write the idle default trigger layout.
    pub async fn restore_default_trigger_mode(&self) -> Result<()> {
        self.trigger.restore_default_trigger_mode().await
    }

    /// Arm the scan test: the next inventory stop hands the trigger to the
    /// barcode scanner until a barcode is read.
    ///
    /// # Errors
    ///
    /// Rejected with [`Error::NotConnected`] or [`Error::DeviceBusy`].
    pub fn arm_scan_test(&self) -> Result<()> {
        if !self.is_connected() {
            self.notifier.toast(UserMessages::SCAN_TEST_REJECTED);
            return Err(Error::NotConnected);
        }
        if self.state.is_busy() {
            self.notifier.toast(UserMessages::SCAN_TEST_REJECTED);
            return Err(Error::DeviceBusy("inventory running".into()));
        }
        self.state.arm_scan_test();
        debug!("Scan test armed");
        Ok(())
    }

    /// Keep the next inventory stop from handing the trigger over.
    ///
    /// A handoff already in progress is unaffected: the next barcode read
    /// still returns the trigger to RFID.
    pub fn disarm_scan_test(&self) {
        self.state.disarm_scan_test();
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    pub fn is_in_mode_handoff(&self) -> bool {
        self.state.is_in_mode_transition()
    }

    pub fn is_scan_test_armed(&self) -> bool {
        self.state.is_scan_test_armed()
    }

    /// Whether the worker reports a connected session and the link is up.
    pub fn is_connected(&self) -> bool {
        self.connection_state().is_connected() && self.reader.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }

    /// Watch connection state changes.
    pub fn connection_states(&self) -> watch::Receiver<ConnectionState> {
        self.connection.clone()
    }

    pub async fn trigger_mode(&self) -> TriggerMode {
        self.trigger.current_mode().await
    }

    /// Disconnect, detach every device listener and wait for the worker.
    ///
    /// Tasks queued before the call complete first.
    pub async fn shutdown(self) -> Result<()> {
        if self.tasks.send(WorkerTask::Teardown).is_err() {
            debug!("Session worker already stopped");
        }

        if let Err(e) = self.worker.await {
            error!("Session worker terminated abnormally: {}", e);
        }
        info!("Session coordinator stopped");
        Ok(())
    }
}
