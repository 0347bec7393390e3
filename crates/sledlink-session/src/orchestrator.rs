//! Scan-test handoff between the RFID engine and the barcode scanner.
//!
//! When the scan test is armed, the end of an inventory run hands the trigger
//! to the barcode scanner; the next barcode read hands it back. The handoff
//! always disables hardware trigger delivery before writing the Barcode
//! layout.

use std::sync::Arc;

use sledlink_core::{Result, TriggerMode};
use tracing::{debug, error, info, warn};

use crate::messages::UserMessages;
use crate::notify::Notifier;
use crate::state::SharedState;
use crate::trigger::TriggerModeController;

/// Drives the RFID to Barcode handoff and the return to RFID.
#[derive(Debug)]
pub struct ScanOrchestrator {
    trigger: Arc<TriggerModeController>,
    state: Arc<SharedState>,
    notifier: Notifier,
}

impl ScanOrchestrator {
    pub fn new(
        trigger: Arc<TriggerModeController>,
        state: Arc<SharedState>,
        notifier: Notifier,
    ) -> Self {
        Self {
            trigger,
            state,
            notifier,
        }
    }

    /// Hand the trigger to the barcode scanner.
    ///
    /// If the Barcode write is rejected, the trigger is returned to RFID,
    /// delivery is re-enabled and the scan test is disarmed.
    ///
    /// # Errors
    ///
    /// Returns the rejection of the Barcode write.
    pub async fn begin_handoff(&self) -> Result<()> {
        self.trigger.subscribe_hardware_trigger_events(false).await;

        match self.trigger.set_trigger_mode(TriggerMode::Barcode).await {
            Ok(()) => {
                info!("Trigger handed to barcode scanner");
                Ok(())
            }
            Err(e) => {
                warn!("Barcode handoff failed: {}, rolling back", e);
                self.roll_back().await;
                Err(e)
            }
        }
    }

    async fn roll_back(&self) {
        if let Err(e) = self.trigger.set_trigger_mode(TriggerMode::Rfid).await {
            error!("Rollback to RFID failed: {}", e);
        }
        self.trigger.subscribe_hardware_trigger_events(true).await;
        self.state.disarm_scan_test();
        self.notifier.dismiss();
        self.notifier.toast(UserMessages::HANDOFF_FAILED);
    }

    /// A barcode was read. Return the trigger to RFID if a handoff is in
    /// progress, whether or not the scan test is still armed.
    ///
    /// # Errors
    ///
    /// Returns the rejection of the RFID write. The handoff stays in progress
    /// so the next barcode read retries.
    pub async fn complete_handoff(&self) -> Result<()> {
        if !self.state.is_in_mode_transition() {
            debug!("Barcode read outside a scan-test handoff");
            return Ok(());
        }

        self.notifier.dismiss();
        self.notifier.toast(UserMessages::RESTORE_TO_RFID);

        self.trigger.set_trigger_mode(TriggerMode::Rfid).await?;

        self.state.disarm_scan_test();
        info!("Scan test complete, trigger back on RFID");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sledlink_hardware::mock::{MockCall, MockReader, MockReaderHandle};
    use sledlink_hardware::{
        AnyReaderDevice, EventSubscription, ReaderDescriptor, ReaderDevice, Transport,
        TriggerLayout,
    };
    use std::time::Duration;

    use crate::readiness::ReadinessGate;
    use crate::trigger::layout_for;

    async fn fixture() -> (ScanOrchestrator, Arc<SharedState>, MockReaderHandle) {
        let (reader, handle) = MockReader::new();
        let sled = ReaderDescriptor::new("RFD4031-G10B700-WR", Transport::ServiceUsb);
        handle.add_reader(sled.clone());
        reader.connect(&sled).await.unwrap();
        handle.clear_calls();

        let state = Arc::new(SharedState::new());
        let (notifier, _notifications) = Notifier::channel();
        let gate = ReadinessGate::new(Arc::clone(&state), 10, Duration::from_millis(200));
        let trigger = Arc::new(TriggerModeController::new(
            Arc::new(AnyReaderDevice::Mock(reader)),
            Arc::clone(&state),
            gate,
            notifier.clone(),
        ));

        (
            ScanOrchestrator::new(trigger, Arc::clone(&state), notifier),
            state,
            handle,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_handoff_disables_delivery_before_write() {
        let (orchestrator, state, handle) = fixture().await;
        state.arm_scan_test();
        state.begin_mode_transition();

        orchestrator.begin_handoff().await.unwrap();

        let calls = handle.calls();
        assert_eq!(
            calls[0],
            MockCall::SetEventEnabled(EventSubscription::HandheldTrigger, false)
        );
        assert_eq!(
            calls[1],
            MockCall::SetTriggerLayout(layout_for(TriggerMode::Barcode))
        );
        assert!(state.is_in_mode_transition());
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_restores_rfid_and_disarms() {
        let (orchestrator, state, handle) = fixture().await;
        state.arm_scan_test();
        state.begin_mode_transition();
        orchestrator.begin_handoff().await.unwrap();

        orchestrator.complete_handoff().await.unwrap();

        assert!(!state.is_scan_test_armed());
        assert!(!state.is_in_mode_transition());
        assert_eq!(handle.layout(), layout_for(TriggerMode::Rfid));
        assert!(handle.is_event_enabled(EventSubscription::HandheldTrigger));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_handoff_rolls_back() {
        let (orchestrator, state, handle) = fixture().await;
        state.arm_scan_test();
        state.begin_mode_transition();
        handle.set_layout_failures(1);

        assert!(orchestrator.begin_handoff().await.is_err());

        assert!(!state.is_scan_test_armed());
        assert!(!state.is_in_mode_transition());
        assert_eq!(handle.layout(), layout_for(TriggerMode::Rfid));
        assert!(handle.is_event_enabled(EventSubscription::HandheldTrigger));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_restore_keeps_test_armed() {
        let (orchestrator, state, handle) = fixture().await;
        state.arm_scan_test();
        state.begin_mode_transition();
        orchestrator.begin_handoff().await.unwrap();
        handle.set_layout_failures(1);

        assert!(orchestrator.complete_handoff().await.is_err());
        assert!(state.is_scan_test_armed());
        assert!(state.is_in_mode_transition());

        orchestrator.complete_handoff().await.unwrap();
        assert!(!state.is_scan_test_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_after_disarm_still_restores_rfid() {
        let (orchestrator, state, handle) = fixture().await;
        state.arm_scan_test();
        state.begin_mode_transition();
        orchestrator.begin_handoff().await.unwrap();
        state.disarm_scan_test();

        orchestrator.complete_handoff().await.unwrap();

        assert!(!state.is_in_mode_transition());
        assert_eq!(handle.layout(), layout_for(TriggerMode::Rfid));
        assert!(handle.is_event_enabled(EventSubscription::HandheldTrigger));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_rollback_is_retried_on_next_barcode() {
        let (orchestrator, state, handle) = fixture().await;
        state.arm_scan_test();
        state.begin_mode_transition();
        // Barcode write and the rollback RFID write both rejected
        handle.set_layout_failures(2);

        assert!(orchestrator.begin_handoff().await.is_err());
        assert!(!state.is_scan_test_armed());
        assert!(state.is_in_mode_transition());

        orchestrator.complete_handoff().await.unwrap();

        assert!(!state.is_in_mode_transition());
        assert_eq!(handle.layout(), layout_for(TriggerMode::Rfid));
        assert!(handle.is_event_enabled(EventSubscription::HandheldTrigger));
    }

    #[tokio::test(start_paused = true)]
    async fn test_barcode_outside_handoff_changes_nothing() {
        let (orchestrator, state, handle) = fixture().await;
        state.arm_scan_test();

        orchestrator.complete_handoff().await.unwrap();

        assert!(state.is_scan_test_armed());
        assert!(handle.calls().is_empty());
        assert_eq!(handle.layout(), TriggerLayout::DEFAULT);
    }
}
