//! Mapping of device errors onto the coordinator error taxonomy.

use sledlink_core::Error;
use sledlink_hardware::HardwareError;

/// Collapse an SDK error into the coordinator taxonomy.
///
/// A reader already running an operation is a busy condition the caller can
/// retry; a dropped link is a lost connection; everything else is a failed
/// command.
pub fn device_error(err: HardwareError) -> Error {
    match err {
        HardwareError::OperationInProgress { .. } => Error::DeviceBusy(err.to_string()),
        HardwareError::Disconnected { .. } => Error::ConnectionLost(err.to_string()),
        other => Error::DeviceCommandFailure(other.to_string()),
    }
}
