//! Serial IMU telemetry ingest.
//!
//! navstream reads newline-delimited records from a sensor bridge, keeps
//! the ones carrying the record header, hands them across a bounded queue
//! and parses them into typed frames on a second thread.
//!
//! # Crate Structure
//!
//! - [`transport`] serial device access and timed descriptor reads (Unix)
//! - [`frame`] schema, line parser and bounded line reader
//! - [`pipeline`] reader/consumer loops, queue, shutdown and counters
//!
//! ```no_run
//! # #[cfg(unix)]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use navstream::frame::{Field, LineReader, TelemetryFrame};
//! use navstream::pipeline::{Pipeline, PipelineConfig};
//! use navstream::transport::{SerialConfig, SerialPort};
//!
//! let port = SerialPort::open(&SerialConfig::new("/dev/ttyUSB0"))?;
//! let handle = Pipeline::spawn(
//!     LineReader::new(port),
//!     |frame: TelemetryFrame| println!("yaw={:?}", frame.get(Field::Yaw)),
//!     PipelineConfig::default(),
//! )?;
//! // ... later
//! let report = handle.shutdown()?;
//! println!("{} frames", report.stats.frames_parsed);
//! # Ok(())
//! # }
//! # #[cfg(not(unix))]
//! # fn main() {}
//! ```

/// Re-export transport types.
pub mod transport {
    pub use navstream_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use navstream_frame::*;
}

/// Re-export pipeline types.
pub mod pipeline {
    pub use navstream_pipeline::*;
}
