use crate::monitor::{Condition, Monitor};
use std::collections::VecDeque;
use std::sync::Arc;

/// Buffer state guarded by the monitor. The `closed` flag is monotonic:
/// set once, never cleared.
#[derive(Debug)]
struct Slots<T> {
    items: VecDeque<T>,
    closed: bool,
}

#[derive(Debug)]
struct Shared<T> {
    state: Monitor<Slots<T>>,
    not_full: Condition,
    not_empty: Condition,
    capacity: usize,
}

/// A bounded FIFO buffer connecting two pipeline stages.
///
/// `push` blocks while the buffer is full, `pop` blocks while it is empty.
/// A one-shot [`close`](Buffer::close) wakes every blocked thread: producers
/// get their item back, consumers drain whatever is already enqueued and
/// then observe end-of-stream.
///
/// The buffer is a cheap-to-clone handle; clones share the same slots.
#[derive(Debug)]
pub struct Buffer<T: Send> {
    shared: Arc<Shared<T>>,
}

impl<T: Send> Clone for Buffer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send> Buffer<T> {
    /// Create a new buffer holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "buffer capacity must be nonzero");
        Self {
            shared: Arc::new(Shared {
                state: Monitor::new(Slots {
                    items: VecDeque::with_capacity(capacity),
                    closed: false,
                }),
                not_full: Condition::new(),
                not_empty: Condition::new(),
                capacity,
            }),
        }
    }

    /// Push an item, blocking while the buffer is full.
    ///
    /// On `Ok` ownership of the item transfers to the buffer. If the buffer
    /// is closed, or closes while this call is blocked, the item is handed
    /// back in `Err` and nothing is enqueued.
    pub fn push(&self, item: T) -> Result<(), T> {
        let mut slots = self.shared.state.enter();
        while slots.items.len() == self.shared.capacity && !slots.closed {
            self.shared.not_full.wait(&mut slots);
        }
        if slots.closed {
            return Err(item);
        }
        slots.items.push_back(item);
        self.shared.not_empty.signal();
        Ok(())
    }

    /// Pop the oldest item, blocking while the buffer is empty.
    ///
    /// After [`close`](Buffer::close), remaining items are delivered in FIFO
    /// order; once drained, every call returns `None` (end-of-stream).
    pub fn pop(&self) -> Option<T> {
        let mut slots = self.shared.state.enter();
        while slots.items.is_empty() && !slots.closed {
            self.shared.not_empty.wait(&mut slots);
        }
        let item = slots.items.pop_front();
        if item.is_some() {
            self.shared.not_full.signal();
        }
        item
    }

    /// Close the buffer. Idempotent.
    ///
    /// Subsequent pushes are rejected; pops drain the remaining items and
    /// then report end-of-stream. All currently blocked threads are woken.
    pub fn close(&self) {
        let mut slots = self.shared.state.enter();
        slots.closed = true;
        self.shared.not_full.broadcast();
        self.shared.not_empty.broadcast();
    }

    /// Whether the buffer has been closed. Snapshot only.
    pub fn is_closed(&self) -> bool {
        self.shared.state.enter().closed
    }

    /// Current number of enqueued items. Snapshot only.
    pub fn len(&self) -> usize {
        self.shared.state.enter().items.len()
    }

    /// Whether the buffer is currently empty. Snapshot only.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of items the buffer can hold
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_buffer_push_pop() {
        let buffer = Buffer::new(10);
        assert!(buffer.push(42).is_ok());
        assert_eq!(buffer.pop(), Some(42));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fifo_order() {
        let buffer = Buffer::new(8);
        for i in 0..8 {
            buffer.push(i).unwrap();
        }
        for i in 0..8 {
            assert_eq!(buffer.pop(), Some(i));
        }
    }

    #[test]
    #[should_panic(expected = "capacity must be nonzero")]
    fn test_zero_capacity_panics() {
        let _buffer: Buffer<i32> = Buffer::new(0);
    }

    #[test]
    fn test_capacity() {
        let buffer: Buffer<i32> = Buffer::new(42);
        assert_eq!(buffer.capacity(), 42);
    }

    #[test]
    fn test_push_blocks_when_full() {
        let buffer = Buffer::new(2);
        buffer.push(1).unwrap();
        buffer.push(2).unwrap();

        let producer = {
            let buffer = buffer.clone();
            thread::spawn(move || buffer.push(3))
        };

        // The third push must still be parked
        thread::sleep(Duration::from_millis(50));
        assert!(!producer.is_finished());
        assert_eq!(buffer.len(), 2);

        assert_eq!(buffer.pop(), Some(1));
        assert_eq!(producer.join().unwrap(), Ok(()));
        assert_eq!(buffer.pop(), Some(2));
        assert_eq!(buffer.pop(), Some(3));
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let buffer: Buffer<i32> = Buffer::new(4);
        let consumer = {
            let buffer = buffer.clone();
            thread::spawn(move || buffer.pop())
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!consumer.is_finished());

        buffer.push(7).unwrap();
        assert_eq!(consumer.join().unwrap(), Some(7));
    }

    #[test]
    fn test_close_is_idempotent() {
        let buffer: Buffer<i32> = Buffer::new(4);
        buffer.close();
        buffer.close();
        assert!(buffer.is_closed());
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_close_rejects_push() {
        let buffer = Buffer::new(4);
        buffer.close();
        assert_eq!(buffer.push(5), Err(5));
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_close_unblocks_parked_producer() {
        let buffer = Buffer::new(1);
        buffer.push(1).unwrap();

        let producer = {
            let buffer = buffer.clone();
            thread::spawn(move || buffer.push(2))
        };

        thread::sleep(Duration::from_millis(50));
        buffer.close();
        // The parked producer gets its item back, nothing was enqueued
        assert_eq!(producer.join().unwrap(), Err(2));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_close_unblocks_parked_consumer() {
        let buffer: Buffer<i32> = Buffer::new(4);
        let consumer = {
            let buffer = buffer.clone();
            thread::spawn(move || buffer.pop())
        };

        thread::sleep(Duration::from_millis(50));
        buffer.close();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn test_post_close_drain() {
        let buffer = Buffer::new(8);
        for i in 0..5 {
            buffer.push(i).unwrap();
        }
        buffer.close();

        // Remaining items come out in FIFO order, then end-of-stream
        for i in 0..5 {
            assert_eq!(buffer.pop(), Some(i));
        }
        assert_eq!(buffer.pop(), None);
        assert_eq!(buffer.pop(), None);
    }

    #[test]
    fn test_spsc_ordering_under_contention() {
        let buffer = Buffer::new(4);
        let n = 10_000u32;

        let consumer = {
            let buffer = buffer.clone();
            thread::spawn(move || {
                let mut seen = Vec::with_capacity(n as usize);
                while let Some(item) = buffer.pop() {
                    seen.push(item);
                }
                seen
            })
        };

        for i in 0..n {
            buffer.push(i).unwrap();
        }
        buffer.close();

        let seen = consumer.join().unwrap();
        assert_eq!(seen, (0..n).collect::<Vec<_>>());
    }
}
