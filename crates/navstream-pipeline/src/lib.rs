//! Producer/consumer ingest pipeline for navstream.
//!
//! ```text
//! transport ─▶ reader loop ─▶ bounded queue ─▶ consumer loop ─▶ parser ─▶ FrameProcessor
//! ```
//!
//! Two threads share only the queue, the [`ShutdownSignal`] and the atomic
//! [`PipelineStats`]. Both loops poll the signal once per iteration, so
//! shutdown takes at most one transport read timeout plus one dequeue
//! timeout. Line order is preserved from the wire to the processor.

pub mod config;
pub mod consumer;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod producer;
pub mod queue;
pub mod shutdown;
pub mod stats;

pub use config::{OverflowPolicy, PipelineConfig, DEFAULT_DEQUEUE_TIMEOUT, DEFAULT_QUEUE_CAPACITY};
pub use consumer::{run_consumer, ConsumerExit};
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineHandle, PipelineReport};
pub use processor::FrameProcessor;
pub use producer::{run_reader, ReaderExit};
pub use queue::{line_queue, Dequeued, Enqueued, QueueConsumer, QueueProducer};
pub use shutdown::ShutdownSignal;
pub use stats::{PipelineStats, StatsSnapshot};
