//! Mock barcode scanner service for testing and development.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::Result;
use crate::error::HardwareError;
use crate::events::{DeviceEvent, DeviceEventListener, ScannerEvent};
use crate::traits::ScannerDevice;
use crate::types::ScannerInfo;

/// One call made against a [`MockScanner`], in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerCall {
    EstablishSession(u32),
    TerminateSession(u32),
    PullTrigger(u32),
}

#[derive(Default)]
struct ScannerState {
    scanners: Vec<ScannerInfo>,
    listener: Option<Arc<dyn DeviceEventListener>>,
    sessions: HashSet<u32>,
    barcodes: VecDeque<String>,
    calls: Vec<ScannerCall>,
}

impl fmt::Debug for ScannerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerState")
            .field("scanners", &self.scanners)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

fn lock(state: &Mutex<ScannerState>) -> MutexGuard<'_, ScannerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn deliver(target: Option<Arc<dyn DeviceEventListener>>, event: ScannerEvent) {
    if let Some(listener) = target {
        trace!("Mock scanner delivering {:?}", event);
        listener.on_event(DeviceEvent::Scanner(event));
    }
}

/// Mock barcode scanner service.
///
/// # Examples
///
/// ```
/// use sledlink_hardware::mock::MockScanner;
/// use sledlink_hardware::traits::ScannerDevice;
/// use sledlink_hardware::types::ScannerInfo;
///
/// #[tokio::main]
/// async fn main() -> sledlink_hardware::Result<()> {
///     let (scanner, handle) = MockScanner::new();
///     handle.add_scanner(ScannerInfo::new(1, "RFD4031-G10B700-WR"));
///
///     let scanners = scanner.available_scanners().await?;
///     scanner.establish_session(scanners[0].scanner_id).await?;
///     assert!(handle.has_session(1));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MockScanner {
    state: Arc<Mutex<ScannerState>>,
}

impl MockScanner {
    /// Create a new mock scanner service with no scanners.
    pub fn new() -> (Self, MockScannerHandle) {
        let state = Arc::new(Mutex::new(ScannerState::default()));
        let scanner = Self {
            state: Arc::clone(&state),
        };
        (scanner, MockScannerHandle { state })
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new().0
    }
}

impl ScannerDevice for MockScanner {
    fn set_event_listener(&self, listener: Option<Arc<dyn DeviceEventListener>>) {
        lock(&self.state).listener = listener;
    }

    async fn available_scanners(&self) -> Result<Vec<ScannerInfo>> {
        Ok(lock(&self.state).scanners.clone())
    }

    async fn establish_session(&self, scanner_id: u32) -> Result<()> {
        let (info, target) = {
            let mut state = lock(&self.state);
            state.calls.push(ScannerCall::EstablishSession(scanner_id));
            let info = state
                .scanners
                .iter()
                .find(|s| s.scanner_id == scanner_id)
                .cloned()
                .ok_or_else(|| HardwareError::disconnected(format!("scanner {scanner_id}")))?;
            state.sessions.insert(scanner_id);
            (info, state.listener.clone())
        };

        deliver(target, ScannerEvent::SessionEstablished(info));
        Ok(())
    }

    async fn terminate_session(&self, scanner_id: u32) -> Result<()> {
        let target = {
            let mut state = lock(&self.state);
            state.calls.push(ScannerCall::TerminateSession(scanner_id));
            if !state.sessions.remove(&scanner_id) {
                return Ok(());
            }
            state.listener.clone()
        };

        deliver(target, ScannerEvent::SessionTerminated(scanner_id));
        Ok(())
    }

    async fn pull_trigger(&self, scanner_id: u32) -> Result<()> {
        let (barcode, target) = {
            let mut state = lock(&self.state);
            state.calls.push(ScannerCall::PullTrigger(scanner_id));
            if !state.sessions.contains(&scanner_id) {
                return Err(HardwareError::invalid_usage(format!(
                    "no session with scanner {scanner_id}"
                )));
            }
            (state.barcodes.pop_front(), state.listener.clone())
        };

        if let Some(data) = barcode {
            deliver(
                target,
                ScannerEvent::Barcode {
                    data,
                    symbology: None,
                    scanner_id,
                },
            );
        }
        Ok(())
    }
}

/// Handle for controlling a [`MockScanner`].
#[derive(Debug, Clone)]
pub struct MockScannerHandle {
    state: Arc<Mutex<ScannerState>>,
}

impl MockScannerHandle {
    /// Make a scanner available. Emits `Appeared`.
    pub fn add_scanner(&self, info: ScannerInfo) {
        let target = {
            let mut state = lock(&self.state);
            state.scanners.push(info.clone());
            state.listener.clone()
        };
        deliver(target, ScannerEvent::Appeared(info));
    }

    /// Remove a scanner. Emits `Disappeared` and drops its session.
    pub fn remove_scanner(&self, scanner_id: u32) {
        let target = {
            let mut state = lock(&self.state);
            state.scanners.retain(|s| s.scanner_id != scanner_id);
            state.sessions.remove(&scanner_id);
            state.listener.clone()
        };
        deliver(target, ScannerEvent::Disappeared(scanner_id));
    }

    /// Decode a barcode on a scanner, as if its trigger was pulled by hand.
    pub fn scan_barcode(&self, scanner_id: u32, data: impl Into<String>) {
        let target = lock(&self.state).listener.clone();
        deliver(
            target,
            ScannerEvent::Barcode {
                data: data.into(),
                symbology: Some("CODE128".to_string()),
                scanner_id,
            },
        );
    }

    /// Queue a barcode to be decoded on the next software trigger pull.
    pub fn queue_barcode(&self, data: impl Into<String>) {
        lock(&self.state).barcodes.push_back(data.into());
    }

    /// Whether a session with the scanner is open.
    pub fn has_session(&self, scanner_id: u32) -> bool {
        lock(&self.state).sessions.contains(&scanner_id)
    }

    /// Whether a scanner event listener is registered.
    pub fn has_listener(&self) -> bool {
        lock(&self.state).listener.is_some()
    }

    /// Every call made against the scanner service so far.
    pub fn calls(&self) -> Vec<ScannerCall> {
        lock(&self.state).calls.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Mutex<Vec<DeviceEvent>>);

    impl DeviceEventListener for Recorder {
        fn on_event(&self, event: DeviceEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn test_session_lifecycle_events() {
        let (scanner, handle) = MockScanner::new();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        handle.add_scanner(ScannerInfo::new(7, "RFD40 scanner"));
        scanner.set_event_listener(Some(recorder.clone()));

        scanner.establish_session(7).await.unwrap();
        scanner.terminate_session(7).await.unwrap();
        // Terminating a closed session is a no-op
        scanner.terminate_session(7).await.unwrap();

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            DeviceEvent::Scanner(ScannerEvent::SessionEstablished(_))
        ));
        assert_eq!(
            events[1],
            DeviceEvent::Scanner(ScannerEvent::SessionTerminated(7))
        );
    }

    #[tokio::test]
    async fn test_establish_unknown_scanner_fails() {
        let (scanner, _handle) = MockScanner::new();
        assert!(scanner.establish_session(3).await.is_err());
    }

    #[tokio::test]
    async fn test_pull_trigger_decodes_queued_barcode() {
        let (scanner, handle) = MockScanner::new();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        scanner.set_event_listener(Some(recorder.clone()));
        handle.add_scanner(ScannerInfo::new(1, "sled"));

        assert!(scanner.pull_trigger(1).await.is_err());

        scanner.establish_session(1).await.unwrap();
        handle.queue_barcode("0123456789");
        scanner.pull_trigger(1).await.unwrap();

        let events = recorder.0.lock().unwrap().clone();
        assert!(events.iter().any(|e| matches!(
            e,
            DeviceEvent::Scanner(ScannerEvent::Barcode { data, .. }) if data == "0123456789"
        )));
        assert_eq!(
            handle.calls(),
            vec![
                ScannerCall::PullTrigger(1),
                ScannerCall::EstablishSession(1),
                ScannerCall::PullTrigger(1),
            ]
        );
    }
}
