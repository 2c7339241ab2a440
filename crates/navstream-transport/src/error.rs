use std::path::PathBuf;

/// Errors that can occur while opening or reading a telemetry transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device node.
    #[error("failed to open {device}: {source}")]
    Open {
        device: PathBuf,
        source: std::io::Error,
    },

    /// The device opened but line settings could not be applied.
    #[error("failed to configure {device}: {source}")]
    Configure {
        device: PathBuf,
        source: std::io::Error,
    },

    /// The requested symbol rate has no termios equivalent on this platform.
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// An I/O error occurred on an open transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
