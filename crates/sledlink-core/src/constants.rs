//! Core constants for the handheld sled coordinator.
//!
//! This module centralizes the default values used by the session
//! coordinator: reader selection, readiness polling, tag batching and
//! connection status reporting. Configuration structs in the session crate
//! fall back to these values when a field is not provided.
//!
//! # Usage
//!
//! ```
//! use sledlink_core::constants::*;
//! use std::time::Duration;
//!
//! // Worst-case wait before a configuration write is rejected as busy
//! let ceiling = Duration::from_millis(DEFAULT_IDLE_POLL_INTERVAL_MS) * DEFAULT_IDLE_POLL_ATTEMPTS;
//! assert_eq!(ceiling, Duration::from_secs(2));
//! ```

// ============================================================================
// Reader Selection
// ============================================================================

/// Name prefix of the preferred sled model.
///
/// When discovery returns more than one reader, the first reader whose name
/// starts with this prefix is selected. A single discovered reader is always
/// selected regardless of its name.
///
/// # Examples
///
/// ```
/// use sledlink_core::constants::DEFAULT_READER_NAME_PREFIX;
///
/// assert!("RFD4031-G10B700-WR 1234".starts_with(DEFAULT_READER_NAME_PREFIX));
/// ```
pub const DEFAULT_READER_NAME_PREFIX: &str = "RFD4031-G10B700-WR";

// ============================================================================
// Readiness Polling
// ============================================================================

/// Number of busy-flag checks before a readiness wait gives up.
pub const DEFAULT_IDLE_POLL_ATTEMPTS: u32 = 10;

/// Delay between two busy-flag checks, in milliseconds.
///
/// Together with [`DEFAULT_IDLE_POLL_ATTEMPTS`] this bounds the readiness
/// wait to two seconds.
pub const DEFAULT_IDLE_POLL_INTERVAL_MS: u64 = 200;

// ============================================================================
// Inventory
// ============================================================================

/// Maximum number of tags fetched from the reader per read notification.
pub const DEFAULT_TAG_BATCH_SIZE: usize = 100;

// ============================================================================
// Connection
// ============================================================================

/// Interval between "Connecting... Ns" status updates, in milliseconds.
pub const DEFAULT_CONNECT_STATUS_INTERVAL_MS: u64 = 1000;
