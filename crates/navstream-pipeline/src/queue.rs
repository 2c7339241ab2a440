//! Bounded FIFO hand-off between the reader and consumer loops.
//!
//! Built on `crossbeam::channel::bounded`. The producer half applies the
//! configured [`OverflowPolicy`]; the consumer half waits at most the
//! dequeue timeout per call. Lines come out in the order they went in.

use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, SendTimeoutError, Sender, TrySendError};

use crate::config::OverflowPolicy;
use crate::shutdown::ShutdownSignal;

/// Result of offering a line to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// The line is in the queue.
    Queued,
    /// The queue was full and the incoming line was discarded.
    DroppedNewest,
    /// The queue was full; the oldest line was evicted and this one queued.
    DroppedOldest,
    /// Shutdown was signalled while waiting for space; the line was discarded.
    Cancelled,
    /// The consumer half is gone.
    Closed,
}

/// Result of one dequeue attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dequeued {
    Line(String),
    /// Nothing arrived within the dequeue timeout.
    Empty,
    /// The producer half is gone and every queued line has been taken.
    Closed,
}

/// Producer half of the line queue.
pub struct QueueProducer {
    tx: Sender<String>,
    // Held only under DropOldest, to evict the head. While it lives the
    // channel never reports the consumer as gone, so that policy never
    // returns `Closed`; the reader stops on the shutdown signal instead.
    evict: Option<Receiver<String>>,
    policy: OverflowPolicy,
    wait_slice: Duration,
}

/// Consumer half of the line queue.
pub struct QueueConsumer {
    rx: Receiver<String>,
    timeout: Duration,
}

/// Create a queue holding at most `capacity` lines.
///
/// `timeout` bounds each dequeue wait and each slice of a blocked enqueue.
pub fn line_queue(
    capacity: usize,
    policy: OverflowPolicy,
    timeout: Duration,
) -> (QueueProducer, QueueConsumer) {
    let (tx, rx) = channel::bounded(capacity);
    let evict = match policy {
        OverflowPolicy::DropOldest => Some(rx.clone()),
        OverflowPolicy::Block | OverflowPolicy::DropNewest => None,
    };
    (
        QueueProducer {
            tx,
            evict,
            policy,
            wait_slice: timeout,
        },
        QueueConsumer { rx, timeout },
    )
}

impl QueueProducer {
    /// Offer a line, applying the overflow policy if the queue is full.
    ///
    /// Under [`OverflowPolicy::Block`] this waits for space, checking
    /// `signal` between waits so shutdown is never held up by a full queue.
    pub fn push(&self, line: String, signal: &ShutdownSignal) -> Enqueued {
        match self.policy {
            OverflowPolicy::Block => self.push_blocking(line, signal),
            OverflowPolicy::DropNewest => match self.tx.try_send(line) {
                Ok(()) => Enqueued::Queued,
                Err(TrySendError::Full(_)) => Enqueued::DroppedNewest,
                Err(TrySendError::Disconnected(_)) => Enqueued::Closed,
            },
            OverflowPolicy::DropOldest => self.push_evicting(line),
        }
    }

    fn push_blocking(&self, mut line: String, signal: &ShutdownSignal) -> Enqueued {
        loop {
            match self.tx.send_timeout(line, self.wait_slice) {
                Ok(()) => return Enqueued::Queued,
                Err(SendTimeoutError::Timeout(back)) => {
                    if signal.is_triggered() {
                        return Enqueued::Cancelled;
                    }
                    line = back;
                }
                Err(SendTimeoutError::Disconnected(_)) => return Enqueued::Closed,
            }
        }
    }

    fn push_evicting(&self, mut line: String) -> Enqueued {
        let mut evicted = false;
        loop {
            match self.tx.try_send(line) {
                Ok(()) if evicted => return Enqueued::DroppedOldest,
                Ok(()) => return Enqueued::Queued,
                Err(TrySendError::Full(back)) => {
                    if let Some(evict) = &self.evict {
                        evicted |= evict.try_recv().is_ok();
                    }
                    line = back;
                }
                Err(TrySendError::Disconnected(_)) => return Enqueued::Closed,
            }
        }
    }

    /// Lines currently queued.
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }
}

impl QueueConsumer {
    /// Take the oldest line, waiting up to the dequeue timeout.
    pub fn pop(&self) -> Dequeued {
        match self.rx.recv_timeout(self.timeout) {
            Ok(line) => Dequeued::Line(line),
            Err(RecvTimeoutError::Timeout) => Dequeued::Empty,
            Err(RecvTimeoutError::Disconnected) => Dequeued::Closed,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    const SLICE: Duration = Duration::from_millis(20);

    fn line(i: usize) -> String {
        format!("${i}")
    }

    #[test]
    fn delivers_in_fifo_order() {
        let (tx, rx) = line_queue(8, OverflowPolicy::Block, SLICE);
        let signal = ShutdownSignal::new();
        for i in 0..5 {
            assert_eq!(tx.push(line(i), &signal), Enqueued::Queued);
        }
        for i in 0..5 {
            assert_eq!(rx.pop(), Dequeued::Line(line(i)));
        }
        assert_eq!(rx.pop(), Dequeued::Empty);
    }

    #[test]
    fn empty_pop_waits_for_timeout() {
        let (_tx, rx) = line_queue(1, OverflowPolicy::Block, SLICE);
        let start = Instant::now();
        assert_eq!(rx.pop(), Dequeued::Empty);
        assert!(start.elapsed() >= SLICE);
    }

    #[test]
    fn full_queue_blocks_producer_until_slot_frees() {
        let (tx, rx) = line_queue(2, OverflowPolicy::Block, SLICE);
        let signal = ShutdownSignal::new();
        tx.push(line(0), &signal);
        tx.push(line(1), &signal);
        assert_eq!(tx.len(), 2);

        let producer = {
            let signal = signal.clone();
            std::thread::spawn(move || {
                let outcome = tx.push(line(2), &signal);
                (outcome, tx)
            })
        };

        std::thread::sleep(Duration::from_millis(100));
        assert!(!producer.is_finished(), "producer should be blocked");

        assert_eq!(rx.pop(), Dequeued::Line(line(0)));
        let (outcome, tx) = producer.join().unwrap();
        assert_eq!(outcome, Enqueued::Queued);
        assert!(tx.len() <= tx.capacity());

        assert_eq!(rx.pop(), Dequeued::Line(line(1)));
        assert_eq!(rx.pop(), Dequeued::Line(line(2)));
    }

    #[test]
    fn blocked_producer_observes_shutdown() {
        let (tx, _rx) = line_queue(1, OverflowPolicy::Block, SLICE);
        let signal = ShutdownSignal::new();
        tx.push(line(0), &signal);

        let producer = {
            let signal = signal.clone();
            std::thread::spawn(move || tx.push(line(1), &signal))
        };
        std::thread::sleep(Duration::from_millis(50));
        signal.trigger();

        assert_eq!(producer.join().unwrap(), Enqueued::Cancelled);
    }

    #[test]
    fn drop_newest_keeps_queued_lines() {
        let (tx, rx) = line_queue(2, OverflowPolicy::DropNewest, SLICE);
        let signal = ShutdownSignal::new();
        tx.push(line(0), &signal);
        tx.push(line(1), &signal);
        assert_eq!(tx.push(line(2), &signal), Enqueued::DroppedNewest);

        assert_eq!(rx.pop(), Dequeued::Line(line(0)));
        assert_eq!(rx.pop(), Dequeued::Line(line(1)));
        assert_eq!(rx.pop(), Dequeued::Empty);
    }

    #[test]
    fn drop_oldest_evicts_head() {
        let (tx, rx) = line_queue(2, OverflowPolicy::DropOldest, SLICE);
        let signal = ShutdownSignal::new();
        tx.push(line(0), &signal);
        tx.push(line(1), &signal);
        assert_eq!(tx.push(line(2), &signal), Enqueued::DroppedOldest);
        assert_eq!(tx.len(), 2);

        assert_eq!(rx.pop(), Dequeued::Line(line(1)));
        assert_eq!(rx.pop(), Dequeued::Line(line(2)));
    }

    #[test]
    fn consumer_sees_closed_after_draining() {
        let (tx, rx) = line_queue(4, OverflowPolicy::Block, SLICE);
        let signal = ShutdownSignal::new();
        tx.push(line(0), &signal);
        drop(tx);

        assert_eq!(rx.pop(), Dequeued::Line(line(0)));
        assert_eq!(rx.pop(), Dequeued::Closed);
    }

    #[test]
    fn producer_sees_closed_when_consumer_dropped() {
        let (tx, rx) = line_queue(4, OverflowPolicy::DropNewest, SLICE);
        drop(rx);
        assert_eq!(
            tx.push(line(0), &ShutdownSignal::new()),
            Enqueued::Closed
        );
    }

    #[test]
    fn drop_oldest_keeps_evicting_after_consumer_dropped() {
        let (tx, rx) = line_queue(1, OverflowPolicy::DropOldest, SLICE);
        drop(rx);
        let signal = ShutdownSignal::new();

        assert_eq!(tx.push(line(0), &signal), Enqueued::Queued);
        assert_eq!(tx.push(line(1), &signal), Enqueued::DroppedOldest);
        assert_eq!(tx.len(), 1);
    }
}
