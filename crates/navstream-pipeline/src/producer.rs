use std::io::Read;

use navstream_frame::{FrameError, LineRead, LineReader};
use tracing::{debug, info, warn};

use crate::queue::{Enqueued, QueueProducer};
use crate::shutdown::ShutdownSignal;
use crate::stats::{bump, PipelineStats};

/// Why the reader loop returned.
#[derive(Debug)]
pub enum ReaderExit {
    /// Shutdown was signalled.
    Cancelled,
    /// The transport reached EOF.
    SourceClosed,
    /// The consumer side of the queue went away.
    QueueClosed,
    /// The transport failed.
    Failed(FrameError),
}

impl ReaderExit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReaderExit::Cancelled => "cancelled",
            ReaderExit::SourceClosed => "source-closed",
            ReaderExit::QueueClosed => "queue-closed",
            ReaderExit::Failed(_) => "failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ReaderExit::Failed(_))
    }
}

/// Read lines from `reader` and queue those starting with `header`.
///
/// Runs until shutdown, EOF, or a fatal transport error. Read timeouts,
/// oversized lines and lines without the header are counted and skipped.
pub fn run_reader<R: Read>(
    mut reader: LineReader<R>,
    queue: QueueProducer,
    header: char,
    signal: &ShutdownSignal,
    stats: &PipelineStats,
) -> ReaderExit {
    info!(%header, capacity = queue.capacity(), policy = ?queue.policy(), "reader loop started");

    let exit = loop {
        if signal.is_triggered() {
            break ReaderExit::Cancelled;
        }

        let (text, lossy) = match reader.read_line() {
            Ok(LineRead::Line { text, lossy }) => (text, lossy),
            Ok(LineRead::Timeout) => {
                bump(&stats.read_timeouts);
                continue;
            }
            Err(FrameError::LineTooLong { .. }) => {
                bump(&stats.lines_oversized);
                continue;
            }
            Err(FrameError::ConnectionClosed) => break ReaderExit::SourceClosed,
            Err(err) => {
                warn!(error = %err, "transport read failed, stopping reader");
                break ReaderExit::Failed(err);
            }
        };

        bump(&stats.lines_read);
        if lossy {
            bump(&stats.decode_replacements);
        }
        if !text.starts_with(header) {
            bump(&stats.lines_filtered);
            continue;
        }

        match queue.push(text, signal) {
            Enqueued::Queued => bump(&stats.lines_enqueued),
            Enqueued::DroppedOldest => {
                bump(&stats.lines_enqueued);
                bump(&stats.lines_dropped);
            }
            Enqueued::DroppedNewest => {
                debug!("queue full, dropped incoming line");
                bump(&stats.lines_dropped);
            }
            Enqueued::Cancelled => break ReaderExit::Cancelled,
            Enqueued::Closed => break ReaderExit::QueueClosed,
        }
    };

    info!(exit = exit.as_str(), "reader loop stopped");
    exit
}
