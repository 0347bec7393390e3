//! User-facing message texts.
//!
//! All strings surfaced to the presentation layer live here so that wording
//! stays consistent across components.

/// Standard user messages.
pub struct UserMessages;

impl UserMessages {
    pub const IGNORED_RFID_BUSY: &'static str = "Ignored: RFID Busy";
    pub const RFID_BUSY_RETRY: &'static str = "RFID busy, retry";
    pub const PULL_TRIGGER_SCAN_BARCODE: &'static str = "Pull Trigger: \r\nScan Barcode";
    pub const RESTORE_TO_RFID: &'static str = "Restore to RFID";
    pub const SKIP_RFID_BUSY: &'static str = "Skip: RFID busy";
    pub const SKIP_NOT_CONNECTED: &'static str = "Skip: reader not connected";
    pub const HANDOFF_FAILED: &'static str = "Barcode handoff failed, trigger restored to RFID";
    pub const SCAN_TEST_REJECTED: &'static str = "Scan test needs a connected, idle reader";

    pub const STATUS_DISCONNECTED: &'static str = "Disconnected";
    pub const STATUS_READER_NOT_FOUND: &'static str = "Failed to find reader";
}

/// "Connecting... 3s"
pub fn connecting(elapsed_secs: u64) -> String {
    format!("Connecting... {}s", elapsed_secs)
}

/// "Connected: RFD4031 (1234 ms)"
pub fn connected_in(host: &str, elapsed_ms: u128) -> String {
    format!("Connected: {} ({} ms)", host, elapsed_ms)
}

/// "Connected: RFD4031"
pub fn connected(host: &str) -> String {
    format!("Connected: {}", host)
}

pub fn connection_failed(reason: &str) -> String {
    format!("Connection failed: {}", reason)
}

pub fn scanner_established(name: &str) -> String {
    format!("Scanner established: {}", name)
}

pub fn reader_disappeared(name: &str) -> String {
    format!("Reader {} disappeared", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_formats() {
        assert_eq!(connecting(3), "Connecting... 3s");
        assert_eq!(connected_in("RFD40", 812), "Connected: RFD40 (812 ms)");
        assert_eq!(connected("RFD40"), "Connected: RFD40");
        assert_eq!(
            connection_failed("link refused"),
            "Connection failed: link refused"
        );
    }

    #[test]
    fn test_messages_not_empty() {
        for text in [
            UserMessages::IGNORED_RFID_BUSY,
            UserMessages::RFID_BUSY_RETRY,
            UserMessages::PULL_TRIGGER_SCAN_BARCODE,
            UserMessages::RESTORE_TO_RFID,
            UserMessages::SKIP_RFID_BUSY,
        ] {
            assert!(!text.trim().is_empty());
        }
    }
}
