mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "navstream", version, about = "Serial IMU telemetry ingest")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "text",
        env = "NAVSTREAM_LOG_FORMAT",
        global = true
    )]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "NAVSTREAM_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use navstream_pipeline::OverflowPolicy;

    use super::*;

    #[test]
    #[cfg(unix)]
    fn parses_stream_with_defaults() {
        let cli = Cli::try_parse_from(["navstream", "stream", "/dev/ttyACM0"])
            .expect("stream args should parse");

        let Command::Stream(args) = cli.command else {
            panic!("expected stream subcommand");
        };
        assert_eq!(args.baud, 921_600);
        assert_eq!(args.pipeline.read_timeout().unwrap(), Duration::from_secs(1));
        assert_eq!(args.pipeline.header, '$');
        assert_eq!(args.pipeline.capacity, 500);

        let config = args.pipeline.to_config(true).unwrap();
        assert_eq!(config.overflow, OverflowPolicy::Block);
        assert_eq!(config.dequeue_timeout, Duration::from_millis(100));
        assert_eq!(config.schema.len(), 10);
    }

    #[test]
    fn parses_replay_pipeline_flags() {
        let cli = Cli::try_parse_from([
            "navstream",
            "replay",
            "capture.log",
            "--capacity",
            "16",
            "--overflow",
            "drop-oldest",
            "--dequeue-timeout",
            "20ms",
            "--read-timeout",
            "250ms",
            "--count",
            "3",
        ])
        .expect("replay args should parse");

        let Command::Replay(args) = cli.command else {
            panic!("expected replay subcommand");
        };
        assert_eq!(args.pipeline.count, Some(3));
        assert_eq!(
            args.pipeline.read_timeout().unwrap(),
            Duration::from_millis(250)
        );
        let config = args.pipeline.to_config(true).unwrap();
        assert_eq!(config.queue_capacity, 16);
        assert_eq!(config.overflow, OverflowPolicy::DropOldest);
        assert_eq!(config.dequeue_timeout, Duration::from_millis(20));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "navstream",
            "parse",
            "$1 2 3",
            "--format",
            "json",
            "--log-level",
            "error",
        ])
        .expect("global flags should parse after subcommand");

        assert!(matches!(cli.format, Some(OutputFormat::Json)));
        assert!(matches!(cli.log_level, LogLevel::Error));
        assert!(matches!(cli.command, Command::Parse(_)));
    }

    #[test]
    fn rejects_unknown_overflow_policy() {
        let err = Cli::try_parse_from(["navstream", "replay", "-", "--overflow", "spill"])
            .expect_err("unknown policy should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    #[cfg(unix)]
    fn stream_requires_device() {
        let err = Cli::try_parse_from(["navstream", "stream"])
            .expect_err("missing device should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
