use std::io::Read;

use navstream_frame::{FrameParser, LineReader, LineReaderConfig, TelemetryFrame};
use navstream_pipeline::{FrameProcessor, Pipeline, PipelineConfig, ReaderExit, ShutdownSignal};
use tracing::{debug, info};

use crate::cmd::PipelineArgs;
use crate::exit::{frame_error, pipeline_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_frame, print_summary, OutputFormat};

/// Prints frames as they arrive and trips the shutdown signal once the
/// requested count has been printed.
struct FramePrinter {
    parser: FrameParser,
    format: OutputFormat,
    printed: u64,
    limit: Option<u64>,
    signal: ShutdownSignal,
}

impl FrameProcessor for FramePrinter {
    fn handle(&mut self, frame: TelemetryFrame) {
        if self.limit.is_some_and(|limit| self.printed >= limit) {
            return;
        }
        self.printed += 1;
        print_frame(self.printed, &frame, &self.parser, self.format);

        if self.limit == Some(self.printed) && self.signal.trigger() {
            debug!(count = self.printed, "frame count reached");
        }
    }
}

/// Run the pipeline over `source` until it stops, then print the summary.
///
/// Returns the exit code for the run; a transport failure surfaces as an
/// error after the summary has been printed.
pub fn run<R: Read + Send + 'static>(
    source: R,
    args: &PipelineArgs,
    config: PipelineConfig,
    signal: ShutdownSignal,
    format: OutputFormat,
) -> CliResult<i32> {
    if args.count == Some(0) {
        return Err(CliError::new(USAGE, "count must be greater than zero"));
    }

    let printer = FramePrinter {
        parser: FrameParser::new(config.schema.clone(), config.header),
        format,
        printed: 0,
        limit: args.count,
        signal: signal.clone(),
    };
    let reader = LineReader::with_config(
        source,
        LineReaderConfig {
            max_line_length: args.max_line_length,
        },
    );

    let handle = Pipeline::spawn_with_signal(reader, printer, config, signal)
        .map_err(|err| pipeline_error("pipeline start failed", err))?;
    let report = handle
        .join()
        .map_err(|err| pipeline_error("pipeline failed", err))?;

    print_summary(&report, format);

    match report.reader {
        ReaderExit::Failed(err) => Err(frame_error("read failed", err)),
        _ => Ok(SUCCESS),
    }
}

/// Route Ctrl-C to `signal` so both loops stop and the summary still prints.
pub fn install_ctrlc_handler(signal: ShutdownSignal) -> CliResult<()> {
    ctrlc::set_handler(move || {
        if signal.trigger() {
            info!("interrupt received, shutting down");
        }
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
