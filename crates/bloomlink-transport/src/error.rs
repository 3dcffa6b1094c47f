use crate::addr::BtAddr;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No bonded device matched and no fallback address was configured.
    #[error("no serial device found among bonded devices")]
    NoDeviceFound,

    /// A Bluetooth address string could not be parsed.
    #[error("invalid bluetooth address: {0:?}")]
    InvalidAddress(String),

    /// Failed to connect to the specified device.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: BtAddr,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RFCOMM sockets are not available on this platform.
    #[error("bluetooth serial transport is not supported on this platform")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, TransportError>;
