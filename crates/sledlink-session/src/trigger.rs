//! Trigger mode controller.
//!
//! Owns the logical [`TriggerMode`] and every write of the hardware trigger
//! layout. Mode changes are serialized by an async mutex held across the
//! whole check, wait, write and update sequence, so two callers (the worker
//! and a direct command) can never interleave their writes.
//!
//! A rejected change never touches the recorded mode. Rejections caused by a
//! running inventory issue one corrective stop so a retry can succeed.

use std::sync::Arc;

use sledlink_core::{Error, Result, TriggerMode};
use sledlink_hardware::{
    AnyReaderDevice, EventSubscription, KeyLayoutType, ReaderDevice, TriggerLayout,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::device_error;
use crate::messages::UserMessages;
use crate::notify::Notifier;
use crate::readiness::{Readiness, ReadinessGate};
use crate::state::SharedState;

/// Hardware layout for a logical trigger mode. Both positions always get the
/// same assignment.
pub fn layout_for(mode: TriggerMode) -> TriggerLayout {
    match mode {
        TriggerMode::Rfid => TriggerLayout::uniform(KeyLayoutType::Rfid),
        TriggerMode::Barcode => TriggerLayout::uniform(KeyLayoutType::SledScan),
    }
}

/// Serialized access to the reader's trigger configuration.
#[derive(Debug)]
pub struct TriggerModeController {
    reader: Arc<AnyReaderDevice>,
    state: Arc<SharedState>,
    gate: ReadinessGate,
    notifier: Notifier,
    mode: Mutex<TriggerMode>,
}

impl TriggerModeController {
    pub fn new(
        reader: Arc<AnyReaderDevice>,
        state: Arc<SharedState>,
        gate: ReadinessGate,
        notifier: Notifier,
    ) -> Self {
        Self {
            reader,
            state,
            gate,
            notifier,
            mode: Mutex::new(TriggerMode::default()),
        }
    }

    /// Last successfully applied mode.
    ///
    /// Waits for any mode change in flight to finish.
    pub async fn current_mode(&self) -> TriggerMode {
        *self.mode.lock().await
    }

    /// Route both trigger positions to `target`.
    ///
    /// On success the mode is recorded, hardware trigger delivery is enabled
    /// for RFID and disabled for Barcode, and switching to RFID ends any
    /// handoff in progress.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if no reader is connected.
    /// - [`Error::DeviceBusy`] if inventory is running or the reader did not
    ///   go idle in time.
    /// - [`Error::DeviceCommandFailure`] or [`Error::ConnectionLost`] if the
    ///   write failed.
    pub async fn set_trigger_mode(&self, target: TriggerMode) -> Result<()> {
        let mut mode = self.mode.lock().await;
        self.ensure_ready("set trigger mode").await?;

        let layout = layout_for(target);
        debug!("Writing trigger layout {} for {} mode", layout, target);

        if let Err(e) = self.reader.set_trigger_layout(layout).await {
            warn!("Trigger configuration failed for {} mode: {}", target, e);
            self.recover_from_busy().await;
            return Err(device_error(e));
        }

        *mode = target;
        info!("Trigger configuration success: {}", target);

        self.subscribe_hardware_trigger_events(target.is_rfid())
            .await;
        if target.is_rfid() {
            self.state.clear_mode_transition();
        }
        Ok(())
    }

    /// Write the idle default layout (upper RFID, lower scan).
    ///
    /// Hardware trigger delivery is re-enabled afterwards whether or not the
    /// write succeeded, as long as a reader is connected.
    ///
    /// # Errors
    ///
    /// Same as [`set_trigger_mode`](Self::set_trigger_mode).
    pub async fn restore_default_trigger_mode(&self) -> Result<()> {
        let mut mode = self.mode.lock().await;
        let result = self.write_default_layout(&mut mode).await;

        if self.reader.is_connected() {
            self.subscribe_hardware_trigger_events(true).await;
        }
        result
    }

    async fn write_default_layout(&self, mode: &mut TriggerMode) -> Result<()> {
        self.ensure_ready("restore default trigger").await?;

        self.log_layout("Before restore").await;
        if let Err(e) = self.reader.set_trigger_layout(TriggerLayout::DEFAULT).await {
            warn!("Default trigger configuration failed: {}", e);
            self.recover_from_busy().await;
            return Err(device_error(e));
        }
        self.log_layout("After restore").await;

        *mode = TriggerMode::Rfid;
        self.state.clear_mode_transition();
        Ok(())
    }

    /// Enable or disable delivery of handheld trigger events.
    ///
    /// Errors are logged, not returned. Does nothing without a connected
    /// reader.
    pub async fn subscribe_hardware_trigger_events(&self, enabled: bool) {
        if !self.reader.is_connected() {
            debug!("Skipping trigger subscription change: reader not connected");
            return;
        }
        match self
            .reader
            .set_event_enabled(EventSubscription::HandheldTrigger, enabled)
            .await
        {
            Ok(()) => debug!("Hardware trigger events enabled={}", enabled),
            Err(e) => warn!("Failed to set hardware trigger events to {}: {}", enabled, e),
        }
    }

    /// Connection and busy checks shared by every configuration write.
    async fn ensure_ready(&self, operation: &str) -> Result<()> {
        if !self.reader.is_connected() {
            debug!("{} rejected: reader not connected", operation);
            return Err(Error::NotConnected);
        }

        if self.gate.is_busy() {
            warn!("{} rejected: inventory running", operation);
            self.recover_from_busy().await;
            return Err(Error::DeviceBusy("inventory running".into()));
        }

        match self.gate.wait().await {
            Readiness::Ready { .. } => Ok(()),
            Readiness::TimedOut { attempts } => {
                warn!(
                    "{} rejected: reader still busy after {} checks",
                    operation, attempts
                );
                self.recover_from_busy().await;
                Err(Error::DeviceBusy(format!(
                    "reader still busy after {} checks",
                    attempts
                )))
            }
        }
    }

    /// Corrective stop so the next attempt finds the reader idle.
    async fn recover_from_busy(&self) {
        if let Err(e) = self.reader.stop_inventory().await {
            warn!("Corrective inventory stop failed: {}", e);
        }
        self.notifier.toast(UserMessages::RFID_BUSY_RETRY);
    }

    async fn log_layout(&self, label: &str) {
        match (
            self.reader.upper_trigger().await,
            self.reader.lower_trigger().await,
        ) {
            (Ok(upper), Ok(lower)) => debug!("{}: upper={}, lower={}", label, upper, lower),
            (Err(e), _) | (_, Err(e)) => debug!("{}: trigger layout unreadable: {}", label, e),
        }
    }
}
