use navstream_pipeline::ShutdownSignal;
use navstream_transport::{SerialConfig, SerialPort};
use tracing::info;

use crate::cmd::{ingest, StreamArgs};
use crate::exit::{transport_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: StreamArgs, format: OutputFormat) -> CliResult<i32> {
    // The consumer stops once a failed device has been drained, so an
    // unplugged bridge ends the run instead of idling.
    let config = args.pipeline.to_config(true)?;
    let serial = SerialConfig {
        device: args.device.clone(),
        baud_rate: args.baud,
        read_timeout: Some(args.pipeline.read_timeout()?),
    };

    let port = SerialPort::open(&serial).map_err(|err| transport_error("open failed", err))?;

    let signal = ShutdownSignal::new();
    ingest::install_ctrlc_handler(signal.clone())?;
    info!(
        device = %port.device().display(),
        baud = port.baud_rate(),
        read_timeout = ?port.read_timeout(),
        "streaming, press Ctrl-C to stop"
    );

    ingest::run(port, &args.pipeline, config, signal, format)
}
