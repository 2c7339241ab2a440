use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use navstream_pipeline::ShutdownSignal;
use tracing::info;

use crate::cmd::{ingest, ReplayArgs};
use crate::exit::{io_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.pipeline.to_config(true)?;
    let read_timeout = args.pipeline.read_timeout()?;
    let source = open_input(&args.input, read_timeout)?;

    let signal = ShutdownSignal::new();
    ingest::install_ctrlc_handler(signal.clone())?;
    info!(input = %args.input.display(), "replaying capture");

    ingest::run(source, &args.pipeline, config, signal, format)
}

/// Open the capture. On Unix every read is bounded by `read_timeout`, so a
/// stdin that stays open cannot hold up shutdown.
#[cfg(unix)]
fn open_input(path: &Path, read_timeout: Duration) -> CliResult<Box<dyn Read + Send>> {
    use navstream_transport::TimedReader;

    use crate::exit::transport_error;

    if path == Path::new("-") {
        let stdin = TimedReader::stdin(read_timeout)
            .map_err(|err| transport_error("open stdin", err))?;
        return Ok(Box::new(stdin));
    }
    let file = File::open(path).map_err(|err| io_error(&format!("open {}", path.display()), err))?;
    Ok(Box::new(TimedReader::new(file, read_timeout)))
}

#[cfg(not(unix))]
fn open_input(path: &Path, _read_timeout: Duration) -> CliResult<Box<dyn Read + Send>> {
    if path == Path::new("-") {
        return Ok(Box::new(std::io::stdin()));
    }
    let file = File::open(path).map_err(|err| io_error(&format!("open {}", path.display()), err))?;
    Ok(Box::new(file))
}
