use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Discovery errors
    #[error("No reader available: {0}")]
    DeviceUnavailable(String),

    // Readiness errors
    #[error("Reader busy, retry: {0}")]
    DeviceBusy(String),

    // Hardware command errors
    #[error("Reader command failed: {0}")]
    DeviceCommandFailure(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Reader not connected")]
    NotConnected,

    // Lifecycle errors
    #[error("Coordinator is shutting down")]
    ShuttingDown,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the failed command can be retried once the reader settles.
    ///
    /// Busy rejections are recovered locally with a corrective stop, so the
    /// caller only needs to try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DeviceBusy(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::DeviceUnavailable("no readers".into()), "No reader available: no readers")]
    #[case(Error::DeviceBusy("inventory running".into()), "Reader busy, retry: inventory running")]
    #[case(Error::DeviceCommandFailure("rejected".into()), "Reader command failed: rejected")]
    #[case(Error::ConnectionLost("RFD40".into()), "Connection lost: RFD40")]
    #[case(Error::NotConnected, "Reader not connected")]
    #[case(Error::ShuttingDown, "Coordinator is shutting down")]
    fn test_error_display(#[case] error: Error, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_only_busy_is_retryable() {
        assert!(Error::DeviceBusy("x".into()).is_retryable());
        assert!(!Error::DeviceCommandFailure("x".into()).is_retryable());
        assert!(!Error::NotConnected.is_retryable());
    }
}
