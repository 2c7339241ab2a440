use std::fmt;
use std::io;

use navstream_frame::{FrameError, Rejection, SchemaError};
use navstream_pipeline::PipelineError;
use navstream_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        io::ErrorKind::InvalidData => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::Open { source, .. } | TransportError::Configure { source, .. }
            if source.kind() == io::ErrorKind::PermissionDenied =>
        {
            PERMISSION_DENIED
        }
        TransportError::UnsupportedBaudRate(_) => USAGE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

/// Map a reader-side failure. Mid-stream I/O errors are transport faults.
pub fn frame_error(context: &str, err: FrameError) -> CliError {
    let code = match &err {
        FrameError::Io(source) if source.kind() == io::ErrorKind::PermissionDenied => {
            PERMISSION_DENIED
        }
        FrameError::Io(_) => TRANSPORT_ERROR,
        FrameError::LineTooLong { .. } => DATA_INVALID,
        FrameError::ConnectionClosed => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    match err {
        SchemaError::Io(source) => io_error(context, source),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn pipeline_error(context: &str, err: PipelineError) -> CliError {
    let code = match err {
        PipelineError::Config(_) => USAGE,
        PipelineError::Spawn { .. } | PipelineError::ThreadPanicked(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn rejection(context: &str, err: Rejection) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}
