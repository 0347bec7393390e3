//! The serialized session worker.
//!
//! One tokio task drains the task queue in order. It owns the connection
//! manager, so every connect, disconnect and configuration sequence it runs
//! completes before the next task starts.

use std::sync::Arc;

use sledlink_hardware::{AnyReaderDevice, AnyScannerDevice, ReaderDevice, ScannerDevice};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::connection::ConnectionManager;
use crate::messages::UserMessages;
use crate::notify::{Notification, Notifier};
use crate::orchestrator::ScanOrchestrator;
use crate::state::SharedState;

/// Work queued for the session worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WorkerTask {
    Connect,
    Disconnect,
    ConnectionLost,
    ReaderDisappeared(String),
    ScannerGone(u32),
    StartInventory,
    StopInventory,
    FetchTags,
    BeginBarcodeHandoff,
    BarcodeRead(String),
    PullScannerTrigger,
    Teardown,
}

pub(crate) struct Worker {
    connection: ConnectionManager,
    orchestrator: ScanOrchestrator,
    reader: Arc<AnyReaderDevice>,
    scanner: Arc<AnyScannerDevice>,
    state: Arc<SharedState>,
    notifier: Notifier,
    tag_batch_size: usize,
    tasks: mpsc::UnboundedReceiver<WorkerTask>,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        connection: ConnectionManager,
        orchestrator: ScanOrchestrator,
        reader: Arc<AnyReaderDevice>,
        scanner: Arc<AnyScannerDevice>,
        state: Arc<SharedState>,
        notifier: Notifier,
        tag_batch_size: usize,
        tasks: mpsc::UnboundedReceiver<WorkerTask>,
    ) -> Self {
        Self {
            connection,
            orchestrator,
            reader,
            scanner,
            state,
            notifier,
            tag_batch_size,
            tasks,
        }
    }

    /// Run until a teardown task arrives or every sender is gone.
    pub(crate) async fn run(mut self) {
        info!("Session worker started");

        while let Some(task) = self.tasks.recv().await {
            trace!("Worker task: {:?}", task);
            if task == WorkerTask::Teardown {
                self.connection.teardown().await;
                break;
            }
            self.handle(task).await;
        }

        info!("Session worker stopped");
    }

    async fn handle(&mut self, task: WorkerTask) {
        match task {
            WorkerTask::Connect => {
                if let Err(e) = self.connection.connect().await {
                    warn!("Connect failed: {}", e);
                }
            }
            WorkerTask::Disconnect => self.connection.disconnect().await,
            WorkerTask::ConnectionLost => self.connection.connection_lost().await,
            WorkerTask::ReaderDisappeared(name) => {
                self.connection.reader_disappeared(&name).await
            }
            WorkerTask::ScannerGone(scanner_id) => self.connection.scanner_gone(scanner_id),
            WorkerTask::StartInventory => self.start_inventory().await,
            WorkerTask::StopInventory => self.stop_inventory().await,
            WorkerTask::FetchTags => self.fetch_tags().await,
            WorkerTask::BeginBarcodeHandoff => {
                if let Err(e) = self.orchestrator.begin_handoff().await {
                    warn!("Scan-test handoff aborted: {}", e);
                }
            }
            WorkerTask::BarcodeRead(_) => {
                if let Err(e) = self.orchestrator.complete_handoff().await {
                    warn!("Return to RFID failed, will retry on next barcode: {}", e);
                }
            }
            WorkerTask::PullScannerTrigger => self.pull_scanner_trigger().await,
            WorkerTask::Teardown => {}
        }
    }

    async fn start_inventory(&self) {
        if !self.connection.is_connected() {
            debug!("Inventory request ignored: reader not connected");
            return;
        }

        if self.state.is_busy() {
            debug!("RFID is busy, inventory request ignored; stopping");
            self.stop_inventory().await;
            return;
        }

        if let Err(e) = self.reader.perform_inventory().await {
            warn!("Error performing inventory: {}", e);
        }
    }

    async fn stop_inventory(&self) {
        if !self.connection.is_connected() {
            debug!("Stop request ignored: reader not connected");
            return;
        }

        if let Err(e) = self.reader.stop_inventory().await {
            warn!("Error stopping inventory: {}", e);
        }
    }

    async fn fetch_tags(&self) {
        if !self.connection.is_connected() {
            return;
        }

        match self.reader.read_tags(self.tag_batch_size).await {
            Ok(tags) if tags.is_empty() => trace!("Read notification with no buffered tags"),
            Ok(tags) => {
                debug!("Fetched {} tags", tags.len());
                self.notifier.send(Notification::TagsRead(tags));
            }
            Err(e) => warn!("Error fetching tags: {}", e),
        }
    }

    async fn pull_scanner_trigger(&self) {
        if !self.connection.is_connected() {
            debug!("Scan request skipped: reader not connected");
            self.notifier.toast(UserMessages::SKIP_NOT_CONNECTED);
            return;
        }
        if self.state.is_busy() {
            debug!("Scan request skipped: RFID busy");
            self.notifier.toast(UserMessages::SKIP_RFID_BUSY);
            return;
        }

        let Some(scanner_id) = self.connection.scanner_id() else {
            warn!("Scan request with no scanner session");
            return;
        };

        if let Err(e) = self.scanner.pull_trigger(scanner_id).await {
            warn!("Scanner {} trigger pull failed: {}", scanner_id, e);
        }
    }
}
