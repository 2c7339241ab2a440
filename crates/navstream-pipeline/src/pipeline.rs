use std::io::Read;
use std::sync::Arc;
use std::thread::JoinHandle;

use navstream_frame::{FrameParser, LineReader};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::consumer::{run_consumer, ConsumerExit};
use crate::error::{PipelineError, Result};
use crate::processor::FrameProcessor;
use crate::producer::{run_reader, ReaderExit};
use crate::queue::line_queue;
use crate::shutdown::ShutdownSignal;
use crate::stats::{PipelineStats, StatsSnapshot};

/// Entry point for starting the reader/consumer pair.
pub struct Pipeline;

impl Pipeline {
    /// Start both loops with a fresh shutdown signal.
    pub fn spawn<R, P>(
        source: LineReader<R>,
        processor: P,
        config: PipelineConfig,
    ) -> Result<PipelineHandle>
    where
        R: Read + Send + 'static,
        P: FrameProcessor + 'static,
    {
        Self::spawn_with_signal(source, processor, config, ShutdownSignal::new())
    }

    /// Start both loops, observing an existing shutdown signal.
    ///
    /// Both threads are running when this returns.
    pub fn spawn_with_signal<R, P>(
        source: LineReader<R>,
        mut processor: P,
        config: PipelineConfig,
        signal: ShutdownSignal,
    ) -> Result<PipelineHandle>
    where
        R: Read + Send + 'static,
        P: FrameProcessor + 'static,
    {
        config.validate()?;

        let stats = Arc::new(PipelineStats::new());
        let (producer, consumer) =
            line_queue(config.queue_capacity, config.overflow, config.dequeue_timeout);
        let parser = FrameParser::new(config.schema.clone(), config.header);
        let header = config.header;
        let exit_when_drained = config.exit_when_drained;

        let reader = {
            let signal = signal.clone();
            let stats = Arc::clone(&stats);
            std::thread::Builder::new()
                .name("navstream-reader".to_string())
                .spawn(move || run_reader(source, producer, header, &signal, &stats))
                .map_err(|source| PipelineError::Spawn {
                    name: "reader",
                    source,
                })?
        };

        let consumer = {
            let signal = signal.clone();
            let stats = Arc::clone(&stats);
            std::thread::Builder::new()
                .name("navstream-consumer".to_string())
                .spawn(move || {
                    run_consumer(
                        consumer,
                        &parser,
                        &mut processor,
                        &signal,
                        &stats,
                        exit_when_drained,
                    )
                })
        };
        let consumer = match consumer {
            Ok(handle) => handle,
            Err(source) => {
                signal.trigger();
                let _ = reader.join();
                return Err(PipelineError::Spawn {
                    name: "consumer",
                    source,
                });
            }
        };

        info!(
            capacity = config.queue_capacity,
            fields = config.schema.len(),
            schema_version = config.schema.version(),
            "pipeline started"
        );

        Ok(PipelineHandle {
            signal,
            stats,
            reader: Some(reader),
            consumer: Some(consumer),
        })
    }
}

/// Outcome of a finished pipeline.
#[derive(Debug)]
pub struct PipelineReport {
    pub reader: ReaderExit,
    pub consumer: ConsumerExit,
    pub stats: StatsSnapshot,
}

/// Owner of the two running loops.
///
/// Dropping the handle signals shutdown and waits for both loops.
pub struct PipelineHandle {
    signal: ShutdownSignal,
    stats: Arc<PipelineStats>,
    reader: Option<JoinHandle<ReaderExit>>,
    consumer: Option<JoinHandle<ConsumerExit>>,
}

impl PipelineHandle {
    /// The signal both loops observe.
    pub fn signal(&self) -> &ShutdownSignal {
        &self.signal
    }

    /// Current counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// True once the reader loop has returned.
    pub fn reader_finished(&self) -> bool {
        self.reader.as_ref().map_or(true, |h| h.is_finished())
    }

    /// True once both loops have returned.
    pub fn is_finished(&self) -> bool {
        self.reader_finished() && self.consumer.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Signal shutdown and wait for both loops.
    pub fn shutdown(self) -> Result<PipelineReport> {
        if self.signal.trigger() {
            debug!("shutdown requested");
        }
        self.join()
    }

    /// Wait for both loops to return on their own.
    pub fn join(mut self) -> Result<PipelineReport> {
        let reader = self.reader.take().map(|h| h.join());
        let consumer = self.consumer.take().map(|h| h.join());

        let reader = match reader {
            Some(Ok(exit)) => exit,
            _ => return Err(PipelineError::ThreadPanicked("reader")),
        };
        let consumer = match consumer {
            Some(Ok(exit)) => exit,
            _ => return Err(PipelineError::ThreadPanicked("consumer")),
        };

        let stats = self.stats.snapshot();
        info!(
            reader = reader.as_str(),
            consumer = consumer.as_str(),
            lines_read = stats.lines_read,
            lines_filtered = stats.lines_filtered,
            frames_parsed = stats.frames_parsed,
            frames_rejected = stats.frames_rejected(),
            lines_dropped = stats.lines_dropped,
            "pipeline stopped"
        );

        Ok(PipelineReport {
            reader,
            consumer,
            stats,
        })
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if self.reader.is_none() && self.consumer.is_none() {
            return;
        }
        self.signal.trigger();
        if let Some(h) = self.reader.take() {
            let _ = h.join();
        }
        if let Some(h) = self.consumer.take() {
            let _ = h.join();
        }
    }
}
