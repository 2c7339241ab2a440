//! Serial transport for navstream.
//!
//! The ingest pipeline only needs a blocking `Read` with a bounded read
//! timeout. This crate provides that over a termios-configured serial device
//! on Unix, and over any other descriptor (stdin, pipes, capture files)
//! through [`TimedReader`].
//!
//! Read timeouts surface as `ErrorKind::TimedOut`. A serial hangup is a
//! `NotConnected` error while a closed pipe is EOF. Every other I/O error is
//! fatal to the reader.

pub mod error;

#[cfg(unix)]
pub mod poll;
#[cfg(unix)]
pub mod serial;

pub use error::{Result, TransportError};

#[cfg(unix)]
pub use poll::TimedReader;
#[cfg(unix)]
pub use serial::{SerialConfig, SerialPort, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT};
