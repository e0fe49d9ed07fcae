//! Per-report output buffering.

use std::io;

use crate::error::Error;
use crate::input::Event;

/// Default number of events buffered per report.
pub const DEFAULT_CAPACITY: usize = 24;

/// Destination for synthesized events (a uinput device in production).
pub trait EventSink {
    fn write(&mut self, events: &[Event]) -> io::Result<()>;
}

/// Write to a sink, logging and discarding failures. Sink writes are never fatal.
pub fn write_best_effort<S: EventSink + ?Sized>(sink: &mut S, events: &[Event]) {
    if let Err(e) = sink.write(events) {
        log::debug!("{}", Error::SinkWrite(e));
    }
}

/// Bounded queue of output events for the report being assembled.
///
/// Overflow is lossy: the event that does not fit is dropped so the input
/// loop never blocks.
#[derive(Debug)]
pub struct ReportBatcher {
    queue: Vec<Event>,
    capacity: usize,
    dropped: u64,
}

impl ReportBatcher {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Total events dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn events(&self) -> &[Event] {
        &self.queue
    }

    pub fn events_mut(&mut self) -> &mut [Event] {
        &mut self.queue
    }

    /// Append one event. Returns false if it was dropped.
    pub fn enqueue(&mut self, event: Event) -> bool {
        if self.queue.len() >= self.capacity {
            self.note_dropped(1);
            return false;
        }
        self.queue.push(event);
        true
    }

    /// Insert `events` ahead of everything already queued, keeping their order.
    ///
    /// These always fit: queued events are evicted from the tail to make room.
    /// Only when `events` alone exceeds the capacity is its own tail dropped.
    pub fn enqueue_front(&mut self, events: &[Event]) {
        let take = events.len().min(self.capacity);
        let keep = self.queue.len().min(self.capacity - take);
        let dropped = (events.len() - take) + (self.queue.len() - keep);
        if dropped > 0 {
            self.queue.truncate(keep);
            self.note_dropped(dropped);
        }
        self.queue.splice(0..0, events[..take].iter().copied());
    }

    /// Write the queued events in one write, then `marker` as a separate write.
    pub fn flush<S: EventSink + ?Sized>(&mut self, sink: &mut S, marker: Event) {
        if !self.queue.is_empty() {
            write_best_effort(sink, &self.queue);
            self.queue.clear();
        }
        write_best_effort(sink, &[marker]);
    }

    fn note_dropped(&mut self, count: usize) {
        self.dropped += count as u64;
        log::debug!(
            "Report buffer full ({} events), dropped {} (total {})",
            self.capacity,
            count,
            self.dropped
        );
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Records every write as a separate batch.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub writes: Vec<Vec<Event>>,
    }

    impl RecordingSink {
        /// All written events, flattened in write order.
        pub fn events(&self) -> Vec<Event> {
            self.writes.iter().flatten().copied().collect()
        }
    }

    impl EventSink for RecordingSink {
        fn write(&mut self, events: &[Event]) -> io::Result<()> {
            self.writes.push(events.to_vec());
            Ok(())
        }
    }

    /// Rejects every write as a full non-blocking device would.
    #[derive(Debug, Default)]
    pub struct FullSink {
        pub attempts: usize,
    }

    impl EventSink for FullSink {
        fn write(&mut self, _events: &[Event]) -> io::Result<()> {
            self.attempts += 1;
            Err(io::ErrorKind::WouldBlock.into())
        }
    }
}
