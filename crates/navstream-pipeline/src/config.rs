use std::time::Duration;

use navstream_frame::{is_valid_header, Schema, DEFAULT_HEADER};
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Default number of raw lines the hand-off queue holds.
pub const DEFAULT_QUEUE_CAPACITY: usize = 500;

/// Default bound on a single dequeue wait.
pub const DEFAULT_DEQUEUE_TIMEOUT: Duration = Duration::from_millis(100);

/// What the reader does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Wait for the consumer to free a slot.
    #[default]
    Block,
    /// Discard the incoming line.
    DropNewest,
    /// Evict the oldest queued line, then enqueue.
    DropOldest,
}

/// Pipeline settings, fixed for the lifetime of a run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Marker character every record line starts with.
    pub header: char,
    /// Ordered field list the records are parsed against.
    pub schema: Schema,
    /// Maximum number of lines waiting between reader and consumer.
    pub queue_capacity: usize,
    /// Full-queue behavior.
    pub overflow: OverflowPolicy,
    /// Upper bound on one dequeue wait (and one blocked-enqueue slice).
    pub dequeue_timeout: Duration,
    /// Stop the consumer once the reader is gone and the queue is empty.
    /// When false the consumer idles until shutdown.
    pub exit_when_drained: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER,
            schema: Schema::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            overflow: OverflowPolicy::Block,
            dequeue_timeout: DEFAULT_DEQUEUE_TIMEOUT,
            exit_when_drained: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_header(self.header) {
            return Err(PipelineError::Config(format!(
                "header {:?} must be a printable ASCII character",
                self.header
            )));
        }
        if self.queue_capacity == 0 {
            return Err(PipelineError::Config(
                "queue capacity must be greater than zero".to_string(),
            ));
        }
        if self.dequeue_timeout.is_zero() {
            return Err(PipelineError::Config(
                "dequeue timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = PipelineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.queue_capacity, 500);
        assert_eq!(cfg.dequeue_timeout, Duration::from_millis(100));
        assert_eq!(cfg.overflow, OverflowPolicy::Block);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let cfg = PipelineConfig {
            queue_capacity: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = PipelineConfig {
            dequeue_timeout: Duration::ZERO,
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn whitespace_header_is_rejected() {
        let cfg = PipelineConfig {
            header: ' ',
            ..PipelineConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("header"));
    }
}
