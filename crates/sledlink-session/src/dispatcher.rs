//! Entry point for every device callback.
//!
//! The dispatcher runs on the device's callback context and must never block.
//! It updates the shared flags directly, publishes notifications, and hands
//! anything that talks to the hardware to the session worker.

use std::sync::Arc;

use sledlink_hardware::{DeviceEvent, DeviceEventListener, ScannerEvent, StatusEvent, TriggerAction};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::messages::{self, UserMessages};
use crate::notify::{Notification, Notifier};
use crate::state::SharedState;
use crate::worker::WorkerTask;

/// Device event listener feeding the session worker.
#[derive(Debug)]
pub struct EventDispatcher {
    state: Arc<SharedState>,
    notifier: Notifier,
    tasks: mpsc::UnboundedSender<WorkerTask>,
}

impl EventDispatcher {
    pub(crate) fn new(
        state: Arc<SharedState>,
        notifier: Notifier,
        tasks: mpsc::UnboundedSender<WorkerTask>,
    ) -> Self {
        Self {
            state,
            notifier,
            tasks,
        }
    }

    fn enqueue(&self, task: WorkerTask) {
        if let Err(e) = self.tasks.send(task) {
            debug!("Worker stopped, dropping {:?}", e.0);
        }
    }

    fn on_status(&self, status: StatusEvent) {
        match status {
            StatusEvent::HandheldTrigger(action) => self.on_trigger(action),
            StatusEvent::Disconnection => {
                warn!("Reader reported disconnection");
                self.enqueue(WorkerTask::ConnectionLost);
            }
            StatusEvent::InventoryStart => {
                self.state.set_busy(true);
                self.notifier.dismiss();
            }
            StatusEvent::InventoryStop => {
                self.state.set_busy(false);
                if self.state.is_scan_test_armed() {
                    self.on_scan_test_stop();
                }
            }
            StatusEvent::OperationEndSummary {
                total_rounds,
                total_tags,
                duration_ms,
            } => debug!(
                "Operation end summary: {} rounds, {} tags, {} ms",
                total_rounds, total_tags, duration_ms
            ),
            other => debug!("Unhandled status event: {}", other.kind()),
        }
    }

    fn on_trigger(&self, action: TriggerAction) {
        if self.state.is_in_mode_transition() {
            debug!("Trigger {:?} dropped: mode handoff in progress", action);
            return;
        }

        match action {
            TriggerAction::Pressed if self.state.is_busy() => {
                debug!("Ignored trigger press: RFID is already busy");
                self.notifier.toast(UserMessages::IGNORED_RFID_BUSY);
            }
            TriggerAction::Pressed => {
                debug!("Trigger pressed: starting inventory");
                self.notifier.send(Notification::Trigger { pressed: true });
                self.enqueue(WorkerTask::StartInventory);
            }
            TriggerAction::Released => {
                debug!("Trigger released: stopping inventory");
                self.notifier.send(Notification::Trigger { pressed: false });
                self.enqueue(WorkerTask::StopInventory);
            }
        }
    }

    /// Inventory stopped while the scan test is armed: hand the trigger over
    /// to the barcode scanner. Only the first stop starts a handoff.
    fn on_scan_test_stop(&self) {
        if !self.state.begin_mode_transition() {
            debug!("Inventory stop during handoff, ignoring");
            return;
        }

        info!("Scan test: inventory stopped, handing trigger to scanner");
        self.notifier.dismiss();
        self.notifier
            .persistent(UserMessages::PULL_TRIGGER_SCAN_BARCODE);
        self.enqueue(WorkerTask::BeginBarcodeHandoff);
    }

    fn on_scanner(&self, event: ScannerEvent) {
        match event {
            ScannerEvent::Appeared(info) => {
                debug!("Scanner appeared: {} ({})", info.name, info.scanner_id)
            }
            ScannerEvent::Disappeared(scanner_id) => {
                debug!("Scanner {} disappeared", scanner_id);
                self.notifier.send(Notification::ScanButtonEnabled(false));
                self.enqueue(WorkerTask::ScannerGone(scanner_id));
            }
            ScannerEvent::SessionEstablished(info) => {
                self.notifier.toast(messages::scanner_established(&info.name));
                self.notifier.send(Notification::ScanButtonEnabled(true));
            }
            ScannerEvent::SessionTerminated(scanner_id) => {
                debug!("Scanner session {} terminated", scanner_id);
                self.notifier.send(Notification::ScanButtonEnabled(false));
                self.enqueue(WorkerTask::ScannerGone(scanner_id));
            }
            ScannerEvent::Barcode {
                data, scanner_id, ..
            } => {
                info!("Barcode from scanner {}: {}", scanner_id, data);
                self.notifier.send(Notification::Barcode(data.clone()));
                self.enqueue(WorkerTask::BarcodeRead(data));
            }
            other => debug!("Unhandled scanner event: {:?}", other),
        }
    }
}

impl DeviceEventListener for EventDispatcher {
    fn on_event(&self, event: DeviceEvent) {
        trace!("Device event: {:?}", event);
        match event {
            DeviceEvent::TagsRead => self.enqueue(WorkerTask::FetchTags),
            DeviceEvent::Status(status) => self.on_status(status),
            DeviceEvent::ReaderAppeared(reader) => {
                info!("Reader appeared: {} on {}", reader.name, reader.transport);
                self.enqueue(WorkerTask::Connect);
            }
            DeviceEvent::ReaderDisappeared(reader) => {
                info!("Reader disappeared: {}", reader.name);
                self.notifier
                    .toast(messages::reader_disappeared(&reader.name));
                self.enqueue(WorkerTask::ReaderDisappeared(reader.name));
            }
            DeviceEvent::Scanner(event) => self.on_scanner(event),
            other => debug!("Unhandled device event: {:?}", other),
        }
    }
}
