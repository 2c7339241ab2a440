use crate::schema::Field;

/// Errors that can occur while delimiting lines from a byte stream.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading from the source.
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source reached EOF and every buffered line has been returned.
    #[error("connection closed")]
    ConnectionClosed,

    /// A line grew past the configured limit without a delimiter.
    #[error("line too long ({len} bytes, max {max})")]
    LineTooLong { len: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;

/// Why a telemetry line did not produce a frame.
///
/// A rejection never carries partially parsed values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    /// Token count differs from the schema length.
    #[error("expected {expected} fields, found {found}")]
    Arity { expected: usize, found: usize },

    /// A token could not be read as a 64-bit float.
    #[error("token {index} ({field}) is not a number: {token:?}")]
    InvalidNumber {
        index: usize,
        field: Field,
        token: String,
    },
}

/// Errors raised while building or loading a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema must name at least one field.
    #[error("schema has no fields")]
    Empty,

    /// Every field may appear at most once.
    #[error("field {0} appears more than once")]
    DuplicateField(Field),

    /// A field name that is not part of the telemetry record.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Schema document exceeds the load limit.
    #[error("schema file too large ({size} bytes, max {max})")]
    TooLarge { size: u64, max: u64 },

    /// Schema document is not valid JSON for a schema.
    #[error("invalid schema json: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema file could not be read.
    #[error("failed to read schema: {0}")]
    Io(#[from] std::io::Error),
}
