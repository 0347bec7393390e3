//! Flags shared between the event dispatcher, the worker and command callers.
//!
//! Device callbacks must never block, so the flags are plain atomics with
//! sequentially consistent ordering rather than lock-protected fields.

use std::sync::atomic::{AtomicBool, Ordering};

/// Coordinator-wide flags.
///
/// - `busy`: true exactly between an observed inventory start and the next
///   inventory stop.
/// - `mode_transition`: set when a scan-test handoff begins, cleared only by a
///   successful switch back to RFID mode. Trigger events are dropped while set.
/// - `scan_test`: the scan-test sequence is armed.
#[derive(Debug, Default)]
pub struct SharedState {
    busy: AtomicBool,
    mode_transition: AtomicBool,
    scan_test: AtomicBool,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub(crate) fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    pub fn is_in_mode_transition(&self) -> bool {
        self.mode_transition.load(Ordering::SeqCst)
    }

    /// Mark the start of an RFID to Barcode handoff.
    ///
    /// Returns `false` if a handoff was already in progress.
    pub(crate) fn begin_mode_transition(&self) -> bool {
        self.mode_transition
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn clear_mode_transition(&self) {
        self.mode_transition.store(false, Ordering::SeqCst);
    }

    pub fn is_scan_test_armed(&self) -> bool {
        self.scan_test.load(Ordering::SeqCst)
    }

    pub(crate) fn arm_scan_test(&self) {
        self.scan_test.store(true, Ordering::SeqCst);
    }

    pub(crate) fn disarm_scan_test(&self) {
        self.scan_test.store(false, Ordering::SeqCst);
    }

    /// Reset inventory and handoff flags for a freshly connected reader.
    ///
    /// The scan-test flag is a user setting and survives reconnects.
    pub(crate) fn reset_for_connection(&self) {
        self.set_busy(false);
        self.clear_mode_transition();
    }
}
