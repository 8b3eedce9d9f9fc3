use crate::block::Event;
use crate::error::{Error, Result};
use crate::sink::Sink;
use alloc::vec::Vec;

/// Fixed-capacity batch buffer of [`Event`]s.
///
/// Allocated once at construction via `Vec::with_capacity` and never
/// reallocated: `append` never pushes past `capacity`, flushing first
/// instead. Invariant: `0 <= len() <= capacity()`.
pub struct LogBuffer {
    entries: Vec<Event>,
    capacity: usize,
    shutdown: bool,
    flush_count: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
            shutdown: false,
            flush_count: 0,
        }
    }

    /// Number of times [`Self::flush`] has actually run (including via
    /// [`Self::shutdown_flush`]). Exposed for tests asserting on
    /// exactly how many implicit flushes a sequence of appends caused.
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes at `entries[len]`; flushes first if the buffer is full,
    /// so the push itself never overflows `capacity`. A no-op after
    /// [`Self::shutdown_flush`].
    pub fn append(&mut self, event: Event, sink: &mut dyn Sink) -> Result<()> {
        if self.shutdown {
            return Ok(());
        }
        if self.entries.len() == self.capacity {
            self.flush(sink)?;
        }
        self.entries.push(event);
        Ok(())
    }

    /// Emits every buffered entry, in insertion order, to `sink`, then
    /// resets the count to zero. Across calls, insertion order is
    /// preserved globally.
    pub fn flush(&mut self, sink: &mut dyn Sink) -> Result<()> {
        self.flush_count += 1;
        for event in self.entries.drain(..) {
            write_event(sink, &event).map_err(|_| Error::SinkWrite)?;
        }
        Ok(())
    }

    /// Flushes unconditionally, then disables further appends.
    /// Idempotent.
    pub fn shutdown_flush(&mut self, sink: &mut dyn Sink) -> Result<()> {
        self.flush(sink)?;
        self.shutdown = true;
        Ok(())
    }
}

fn write_event(sink: &mut dyn Sink, event: &Event) -> core::result::Result<(), ()> {
    match event {
        Event::Store { addr, value } => sink.write_store(*addr, *value),
        Event::Alloc {
            start,
            size,
            context,
        } => sink.write_alloc(*start, *size, &context.describe()),
        Event::Free {
            start,
            size,
            context,
        } => sink.write_free(*start, *size, &context.describe()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::tests::RecordingSink;
    use alloc::vec;

    #[test]
    fn appends_totaling_under_capacity_flush_in_order() {
        let mut buf = LogBuffer::new(16);
        let mut sink = RecordingSink::default();
        for i in 0..5u64 {
            buf.append(Event::Store { addr: i, value: i }, &mut sink).unwrap();
        }
        buf.shutdown_flush(&mut sink).unwrap();
        assert_eq!(sink.stores, vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
    }

    #[test]
    fn buffer_wraps_exactly_once_mid_sequence() {
        let capacity = 4;
        let mut buf = LogBuffer::new(capacity);
        let mut sink = RecordingSink::default();
        for i in 0..(capacity as u64 + 1) {
            buf.append(Event::Store { addr: i, value: i }, &mut sink).unwrap();
        }
        buf.shutdown_flush(&mut sink).unwrap();
        assert_eq!(sink.stores.len(), capacity + 1);
        assert_eq!(buf.flush_count(), 2);
    }

    #[test]
    fn shutdown_flush_is_idempotent_and_disables_append() {
        let mut buf = LogBuffer::new(4);
        let mut sink = RecordingSink::default();
        buf.append(Event::Store { addr: 1, value: 1 }, &mut sink).unwrap();
        buf.shutdown_flush(&mut sink).unwrap();
        buf.shutdown_flush(&mut sink).unwrap();
        buf.append(Event::Store { addr: 2, value: 2 }, &mut sink).unwrap();
        assert_eq!(sink.stores, vec![(1, 1)]);
    }
}
