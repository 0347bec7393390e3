//! Error types for hardware operations.
//!
//! This module defines error types specific to reader and scanner SDK calls,
//! covering disconnection, communication failures, invalid usage, and operations the reader
//! refused to perform.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// The SDK was called in a state where the call is not allowed.
    #[error("Invalid usage: {message}")]
    InvalidUsage { message: String },

    /// The reader refused or failed to execute a command.
    #[error("Operation failed ({status}): {message}")]
    OperationFailure { status: String, message: String },

    /// The reader is executing another operation (typically inventory).
    #[error("Operation in progress: {operation}")]
    OperationInProgress { operation: String },

    /// Reader discovery failed on a transport.
    #[error("Discovery failed: {message}")]
    DiscoveryFailed { message: String },
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid usage error.
    pub fn invalid_usage(message: impl Into<String>) -> Self {
        Self::InvalidUsage {
            message: message.into(),
        }
    }

    /// Create a new operation failure with the SDK status code name.
    pub fn operation_failure(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OperationFailure {
            status: status.into(),
            message: message.into(),
        }
    }

    /// Create a new operation-in-progress error.
    pub fn operation_in_progress(operation: impl Into<String>) -> Self {
        Self::OperationInProgress {
            operation: operation.into(),
        }
    }

    /// Create a new discovery error.
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::DiscoveryFailed {
            message: message.into(),
        }
    }
}
