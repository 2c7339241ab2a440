//! Telemetry record framing for navstream.
//!
//! The sensor bridge prints one ASCII record per line:
//!
//! ```text
//! $<timestamp> <yaw> <pitch> <roll> <gyro_x> ... <accel_z>\n
//! ```
//!
//! - [`reader`] delimits lines from a byte stream with bounded buffering
//! - [`codec`] strips the header marker and maps tokens onto a [`Schema`]
//! - [`schema`] holds the ordered field list shared with the firmware
//!
//! There is no checksum or sequence number in the wire format. A line with
//! the right token count and plausible numbers is accepted as-is.

pub mod codec;
pub mod error;
pub mod reader;
pub mod schema;

pub use codec::{
    format_line, is_valid_header, parse_line, FrameParser, TelemetryFrame, DEFAULT_HEADER,
};
pub use error::{FrameError, Rejection, Result, SchemaError};
pub use reader::{LineRead, LineReader, LineReaderConfig, DEFAULT_MAX_LINE_LENGTH};
pub use schema::{Field, Schema, MAX_SCHEMA_FILE_SIZE, SCHEMA_VERSION};
