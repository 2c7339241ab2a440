use navstream_frame::{FrameParser, Rejection};
use tracing::{info, trace};

use crate::processor::FrameProcessor;
use crate::queue::{Dequeued, QueueConsumer};
use crate::shutdown::ShutdownSignal;
use crate::stats::{bump, PipelineStats};

/// Why the consumer loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerExit {
    /// Shutdown was signalled.
    Cancelled,
    /// The reader finished and every queued line was processed.
    Drained,
}

impl ConsumerExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerExit::Cancelled => "cancelled",
            ConsumerExit::Drained => "drained",
        }
    }
}

/// Take lines off the queue, parse them and hand frames to `processor`.
///
/// Malformed lines are counted and dropped. Once the reader has gone away
/// the loop keeps draining; with `exit_when_drained` unset it then idles in
/// dequeue-timeout steps until shutdown.
pub fn run_consumer<P: FrameProcessor + ?Sized>(
    queue: QueueConsumer,
    parser: &FrameParser,
    processor: &mut P,
    signal: &ShutdownSignal,
    stats: &PipelineStats,
    exit_when_drained: bool,
) -> ConsumerExit {
    info!(fields = parser.schema().len(), "consumer loop started");

    let exit = loop {
        if signal.is_triggered() {
            break ConsumerExit::Cancelled;
        }

        let line = match queue.pop() {
            Dequeued::Line(line) => line,
            Dequeued::Empty => continue,
            Dequeued::Closed if exit_when_drained => break ConsumerExit::Drained,
            Dequeued::Closed => {
                std::thread::sleep(queue.timeout());
                continue;
            }
        };

        match parser.parse(&line) {
            Ok(frame) => {
                bump(&stats.frames_parsed);
                processor.handle(frame);
            }
            Err(rejection) => {
                match rejection {
                    Rejection::Arity { .. } => bump(&stats.frames_rejected_arity),
                    Rejection::InvalidNumber { .. } => bump(&stats.frames_rejected_numeric),
                }
                trace!(%rejection, line = %line, "dropping malformed line");
            }
        }
    };

    info!(exit = exit.as_str(), "consumer loop stopped");
    exit
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use navstream_frame::{Field, Schema, TelemetryFrame};

    use super::*;
    use crate::config::OverflowPolicy;
    use crate::queue::line_queue;

    const SLICE: Duration = Duration::from_millis(10);

    fn abc_parser() -> FrameParser {
        FrameParser::new(
            Schema::new(vec![Field::Timestamp, Field::Yaw, Field::Pitch]).unwrap(),
            '$',
        )
    }

    #[test]
    fn parses_and_forwards_valid_lines_in_order() {
        let (tx, rx) = line_queue(8, OverflowPolicy::Block, SLICE);
        let signal = ShutdownSignal::new();
        for line in ["$1.0 2.0 3.0", "$1.0 2.0", "$1.0 x 3.0", "$4 5 6"] {
            tx.push(line.to_string(), &signal);
        }
        drop(tx);

        let stats = PipelineStats::new();
        let mut frames: Vec<TelemetryFrame> = Vec::new();
        let exit = run_consumer(
            rx,
            &abc_parser(),
            &mut |frame: TelemetryFrame| frames.push(frame),
            &signal,
            &stats,
            true,
        );

        assert_eq!(exit, ConsumerExit::Drained);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].get(Field::Timestamp), Some(1.0));
        assert_eq!(frames[0].get(Field::Pitch), Some(3.0));
        assert_eq!(frames[1].get(Field::Yaw), Some(5.0));

        let snap = stats.snapshot();
        assert_eq!(snap.frames_parsed, 2);
        assert_eq!(snap.frames_rejected_arity, 1);
        assert_eq!(snap.frames_rejected_numeric, 1);
    }

    #[test]
    fn idles_after_reader_gone_until_shutdown() {
        let (tx, rx) = line_queue(8, OverflowPolicy::Block, SLICE);
        drop(tx);

        let signal = ShutdownSignal::new();
        let remote = signal.clone();
        let trigger = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(60));
            remote.trigger();
        });

        let start = Instant::now();
        let exit = run_consumer(
            rx,
            &abc_parser(),
            &mut |_frame: TelemetryFrame| {},
            &signal,
            &PipelineStats::new(),
            false,
        );
        trigger.join().unwrap();

        assert_eq!(exit, ConsumerExit::Cancelled);
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn cancelled_consumer_does_not_invoke_processor() {
        let (tx, rx) = line_queue(8, OverflowPolicy::Block, SLICE);
        let signal = ShutdownSignal::new();
        tx.push("$1 2 3".to_string(), &signal);
        signal.trigger();

        let mut calls = 0;
        let exit = run_consumer(
            rx,
            &abc_parser(),
            &mut |_frame: TelemetryFrame| calls += 1,
            &signal,
            &PipelineStats::new(),
            false,
        );

        assert_eq!(exit, ConsumerExit::Cancelled);
        assert_eq!(calls, 0);
    }
}
