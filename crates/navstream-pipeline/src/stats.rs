//! Pipeline counters.
//!
//! Both loops bump these as they go; a [`StatsSnapshot`] is a consistent-
//! enough copy for reporting (each counter is read independently).

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub(crate) lines_read: AtomicU64,
    pub(crate) lines_filtered: AtomicU64,
    pub(crate) lines_enqueued: AtomicU64,
    pub(crate) lines_dropped: AtomicU64,
    pub(crate) lines_oversized: AtomicU64,
    pub(crate) decode_replacements: AtomicU64,
    pub(crate) read_timeouts: AtomicU64,
    pub(crate) frames_parsed: AtomicU64,
    pub(crate) frames_rejected_arity: AtomicU64,
    pub(crate) frames_rejected_numeric: AtomicU64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lines_read: load(&self.lines_read),
            lines_filtered: load(&self.lines_filtered),
            lines_enqueued: load(&self.lines_enqueued),
            lines_dropped: load(&self.lines_dropped),
            lines_oversized: load(&self.lines_oversized),
            decode_replacements: load(&self.decode_replacements),
            read_timeouts: load(&self.read_timeouts),
            frames_parsed: load(&self.frames_parsed),
            frames_rejected_arity: load(&self.frames_rejected_arity),
            frames_rejected_numeric: load(&self.frames_rejected_numeric),
        }
    }
}

pub(crate) fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

fn load(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Lines delimited from the transport, any content.
    pub lines_read: u64,
    /// Lines discarded for not starting with the header marker.
    pub lines_filtered: u64,
    /// Lines handed to the queue.
    pub lines_enqueued: u64,
    /// Lines lost to a drop overflow policy.
    pub lines_dropped: u64,
    /// Lines discarded for exceeding the length limit.
    pub lines_oversized: u64,
    /// Lines that needed invalid UTF-8 replaced.
    pub decode_replacements: u64,
    /// Transport reads that returned no data in time.
    pub read_timeouts: u64,
    pub frames_parsed: u64,
    pub frames_rejected_arity: u64,
    pub frames_rejected_numeric: u64,
}

impl StatsSnapshot {
    pub fn frames_rejected(&self) -> u64 {
        self.frames_rejected_arity + self.frames_rejected_numeric
    }
}
