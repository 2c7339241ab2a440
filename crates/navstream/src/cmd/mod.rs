use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use navstream_frame::{Schema, DEFAULT_HEADER, DEFAULT_MAX_LINE_LENGTH};
use navstream_pipeline::{OverflowPolicy, PipelineConfig, DEFAULT_QUEUE_CAPACITY};
#[cfg(unix)]
use navstream_transport::DEFAULT_BAUD_RATE;

use crate::exit::{schema_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

mod ingest;
pub mod parse;
pub mod replay;
pub mod schema;
#[cfg(unix)]
pub mod stream;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest telemetry from a serial device until interrupted.
    #[cfg(unix)]
    Stream(StreamArgs),
    /// Run the pipeline over a capture file or stdin.
    Replay(ReplayArgs),
    /// Parse a single telemetry line.
    Parse(ParseArgs),
    /// Show the active field schema.
    Schema(SchemaArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        #[cfg(unix)]
        Command::Stream(args) => stream::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Parse(args) => parse::run(args, format),
        Command::Schema(args) => schema::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OverflowArg {
    Block,
    DropNewest,
    DropOldest,
}

impl From<OverflowArg> for OverflowPolicy {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Block => OverflowPolicy::Block,
            OverflowArg::DropNewest => OverflowPolicy::DropNewest,
            OverflowArg::DropOldest => OverflowPolicy::DropOldest,
        }
    }
}

/// Settings shared by every command that runs the pipeline.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Record header marker.
    #[arg(long, default_value_t = DEFAULT_HEADER)]
    pub header: char,
    /// Lines held between reader and parser.
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub capacity: usize,
    /// Behavior when the queue is full.
    #[arg(long, value_enum, default_value = "block")]
    pub overflow: OverflowArg,
    /// Longest wait for input before re-checking for shutdown.
    #[arg(long, default_value = "1s")]
    pub read_timeout: String,
    /// Upper bound on one dequeue wait (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms")]
    pub dequeue_timeout: String,
    /// Longest accepted line in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,
    /// Schema file (JSON) replacing the built-in ten-field layout.
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
    /// Stop after printing N frames.
    #[arg(long)]
    pub count: Option<u64>,
}

impl PipelineArgs {
    pub fn to_config(&self, exit_when_drained: bool) -> CliResult<PipelineConfig> {
        if self.max_line_length == 0 {
            return Err(CliError::new(USAGE, "max line length must be greater than zero"));
        }
        Ok(PipelineConfig {
            header: self.header,
            schema: load_schema(self.schema.as_deref())?,
            queue_capacity: self.capacity,
            overflow: self.overflow.into(),
            dequeue_timeout: parse_duration(&self.dequeue_timeout)?,
            exit_when_drained,
        })
    }

    pub fn read_timeout(&self) -> CliResult<Duration> {
        parse_duration(&self.read_timeout)
    }
}

#[cfg(unix)]
#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Serial device path (e.g. /dev/ttyACM0).
    pub device: PathBuf,
    /// Line speed in baud.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Capture file, or `-` for stdin.
    pub input: PathBuf,
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Telemetry line, header included.
    pub line: String,
    /// Record header marker.
    #[arg(long, default_value_t = DEFAULT_HEADER)]
    pub header: char,
    /// Schema file (JSON).
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Schema file (JSON). Default: the built-in ten-field layout.
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
    /// Record header marker.
    #[arg(long, default_value_t = DEFAULT_HEADER)]
    pub header: char,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn load_schema(path: Option<&Path>) -> CliResult<Schema> {
    match path {
        Some(path) => Schema::from_path(path)
            .map_err(|err| schema_error(&format!("schema {}", path.display()), err)),
        None => Ok(Schema::default()),
    }
}

/// Parse `150ms`, `5s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
