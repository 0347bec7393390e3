//! Session coordinator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sledlink_core::constants::{
    DEFAULT_CONNECT_STATUS_INTERVAL_MS, DEFAULT_IDLE_POLL_ATTEMPTS, DEFAULT_IDLE_POLL_INTERVAL_MS,
    DEFAULT_READER_NAME_PREFIX, DEFAULT_TAG_BATCH_SIZE,
};
use sledlink_core::{Error, Result};
use sledlink_hardware::Transport;

/// Configuration for the session coordinator.
///
/// Every field is optional when deserializing; missing fields take the
/// defaults from [`sledlink_core::constants`].
///
/// # Example
///
/// ```
/// use sledlink_session::SessionConfig;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "idle_poll_attempts": 5 }"#).unwrap();
/// assert_eq!(config.idle_poll_attempts, 5);
/// assert_eq!(config.tag_batch_size, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name prefix of the preferred reader when discovery finds several.
    pub device_name_prefix: String,

    /// Transports to enumerate, in order.
    pub transports: Vec<Transport>,

    /// Busy-flag checks before a readiness wait gives up.
    pub idle_poll_attempts: u32,

    /// Delay between busy-flag checks, in milliseconds.
    pub idle_poll_interval_ms: u64,

    /// Maximum tags fetched per read notification.
    pub tag_batch_size: usize,

    /// Interval between "Connecting..." status updates, in milliseconds.
    pub connect_status_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device_name_prefix: DEFAULT_READER_NAME_PREFIX.to_string(),
            transports: Transport::DEFAULT_ORDER.to_vec(),
            idle_poll_attempts: DEFAULT_IDLE_POLL_ATTEMPTS,
            idle_poll_interval_ms: DEFAULT_IDLE_POLL_INTERVAL_MS,
            tag_batch_size: DEFAULT_TAG_BATCH_SIZE,
            connect_status_interval_ms: DEFAULT_CONNECT_STATUS_INTERVAL_MS,
        }
    }
}

impl SessionConfig {
    /// Check the configuration for values the coordinator cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for zero attempts, intervals or batch size,
    /// or an empty transport list.
    pub fn validate(&self) -> Result<()> {
        if self.idle_poll_attempts == 0 {
            return Err(Error::Config("idle_poll_attempts must be at least 1".into()));
        }
        if self.idle_poll_interval_ms == 0 {
            return Err(Error::Config("idle_poll_interval_ms must be positive".into()));
        }
        if self.tag_batch_size == 0 {
            return Err(Error::Config("tag_batch_size must be at least 1".into()));
        }
        if self.connect_status_interval_ms == 0 {
            return Err(Error::Config(
                "connect_status_interval_ms must be positive".into(),
            ));
        }
        if self.transports.is_empty() {
            return Err(Error::Config("transports must not be empty".into()));
        }
        Ok(())
    }

    pub fn idle_poll_interval(&self) -> Duration {
        Duration::from_millis(self.idle_poll_interval_ms)
    }

    pub fn connect_status_interval(&self) -> Duration {
        Duration::from_millis(self.connect_status_interval_ms)
    }
}
