use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input the hardware trigger currently activates.
///
/// The sled exposes two physical trigger positions (upper and lower). The
/// coordinator always drives both to the same assignment, so a single logical
/// mode describes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Trigger starts and stops RFID inventory.
    #[default]
    Rfid,

    /// Trigger fires the sled's barcode scan engine.
    Barcode,
}

impl TriggerMode {
    /// Check if this mode routes the trigger to the RFID engine.
    #[must_use]
    pub fn is_rfid(&self) -> bool {
        matches!(self, Self::Rfid)
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Rfid => write!(f, "RFID"),
            Self::Barcode => write!(f, "Barcode"),
        }
    }
}

/// Logical connection state of the reader session.
///
/// Valid transitions:
/// - Disconnected → Connecting → Connected → Disconnected
/// - Connecting → Disconnected (discovery or connect failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use sledlink_core::ConnectionState;
    ///
    /// assert!(ConnectionState::Disconnected.can_transition_to(ConnectionState::Connecting));
    /// assert!(!ConnectionState::Disconnected.can_transition_to(ConnectionState::Connected));
    /// ```
    pub fn can_transition_to(&self, target: ConnectionState) -> bool {
        matches!(
            (self, target),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting, Self::Connected | Self::Disconnected)
                | (Self::Connected, Self::Disconnected)
        )
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state_str = match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
        };
        write!(f, "{}", state_str)
    }
}
