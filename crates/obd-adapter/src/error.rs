//! OBD-II Adapter Error Types

use thiserror::Error;

/// Errors from adapter communication
///
/// `NoData` is the everyday case (ignition off, PID unsupported): the caller
/// omits the channel and moves on. The rest mark the serial link as broken
/// and trigger a rate-limited reconnect.
#[derive(Debug, Error)]
pub enum ObdError {
    /// Serial port open/read/write failure
    #[error("Serial port error: {0}")]
    Serial(String),

    /// Adapter did not answer within the command timeout
    #[error("Timeout waiting for adapter response after {0}ms")]
    Timeout(u64),

    /// Adapter answered with something unparseable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Vehicle returned no data for the PID
    #[error("No data for PID {0:02X}")]
    NoData(u8),

    /// No serial connection is currently open
    #[error("Adapter not connected")]
    NotConnected,
}

impl From<std::io::Error> for ObdError {
    fn from(err: std::io::Error) -> Self {
        ObdError::Serial(err.to_string())
    }
}

impl From<tokio_serial::Error> for ObdError {
    fn from(err: tokio_serial::Error) -> Self {
        ObdError::Serial(err.to_string())
    }
}
