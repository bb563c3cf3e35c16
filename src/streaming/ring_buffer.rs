//! Lossy ring buffer between a real-time producer and the analysis consumer.
//!
//! The producer side never blocks: it acquires a slot, fills it without
//! holding the cursor lock, then commits. When every slot holds unread data
//! the oldest element is sacrificed so the producer can keep going. The
//! consumer side blocks (or waits with a timeout) until something has been
//! committed, and always sees elements in commit order.
//!
//! ```text
//!   acquire ─▶ fill ─▶ commit            blocking_read / timed_read
//!      │                  │                         ▲
//!      ▼                  ▼                         │
//!  [ slot ][ slot ][ slot ][ slot ] ── available ───┘
//!      ▲ head (oldest unread)
//! ```

use crate::error::BufferError;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Cursor state guarded by one lock. Slots are locked separately.
#[derive(Debug)]
struct Cursors {
    /// Index of the oldest unread slot.
    head: usize,
    /// Committed elements not yet read, in `[0, capacity]`.
    available: usize,
    /// Elements dropped because the producer lapped the consumer.
    overwritten: u64,
    closed: bool,
}

/// Fixed-capacity circular buffer with overwrite-on-overflow semantics.
///
/// Designed for exactly one producer and one consumer. A second concurrent
/// consumer would still be memory safe but could interleave reads in an
/// unspecified order.
#[derive(Debug)]
pub struct RingBuffer<T> {
    slots: Box<[Mutex<T>]>,
    cursors: Mutex<Cursors>,
    readable: Condvar,
}

impl<T: Clone> RingBuffer<T> {
    /// Creates a buffer whose slots are produced by `init`.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn from_fn(capacity: usize, mut init: impl FnMut() -> T) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        let slots = (0..capacity).map(|_| Mutex::new(init())).collect();
        Self {
            slots,
            cursors: Mutex::new(Cursors {
                head: 0,
                available: 0,
                overwritten: 0,
                closed: false,
            }),
            readable: Condvar::new(),
        }
    }

    /// Returns a handle to the next slot to write.
    ///
    /// Never blocks on the consumer. If the buffer is saturated the handle
    /// points at the oldest unread slot, which is dropped from the readable
    /// range immediately so a concurrent reader cannot observe it half-written.
    pub fn acquire_write_slot(&self) -> Result<WriteSlot<'_, T>, BufferError> {
        let mut cursors = self.lock_cursors()?;
        let capacity = self.capacity();
        let index = (cursors.head + cursors.available) % capacity;

        if cursors.available == capacity {
            cursors.head = (cursors.head + 1) % capacity;
            cursors.available -= 1;
            cursors.overwritten += 1;
            tracing::trace!(slot = index, "ring buffer full, overwriting oldest element");
        }

        Ok(WriteSlot {
            buffer: self,
            index,
        })
    }

    /// Blocks until an element is available and returns it.
    ///
    /// Fails with [`BufferError::Closed`] once the buffer is closed and
    /// drained.
    pub fn blocking_read(&self) -> Result<T, BufferError> {
        let mut cursors = self.lock_cursors()?;
        while cursors.available == 0 {
            if cursors.closed {
                return Err(BufferError::Closed);
            }
            cursors = self
                .readable
                .wait(cursors)
                .map_err(|_| BufferError::Poisoned)?;
        }
        self.pop(&mut cursors)
    }

    /// Like [`blocking_read`](Self::blocking_read), but gives up after
    /// `timeout` and returns `Ok(None)`.
    ///
    /// A timeout too large to express as a deadline waits without one.
    pub fn timed_read(&self, timeout: Duration) -> Result<Option<T>, BufferError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.blocking_read().map(Some);
        };
        let mut cursors = self.lock_cursors()?;

        while cursors.available == 0 {
            if cursors.closed {
                return Err(BufferError::Closed);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let (guard, _) = self
                .readable
                .wait_timeout(cursors, remaining)
                .map_err(|_| BufferError::Poisoned)?;
            cursors = guard;
        }

        self.pop(&mut cursors).map(Some)
    }

    /// Closes the buffer and wakes every waiting reader.
    ///
    /// Elements already committed can still be read; afterwards reads fail
    /// with [`BufferError::Closed`]. Commits after close are discarded.
    pub fn close(&self) -> Result<(), BufferError> {
        let mut cursors = self.lock_cursors()?;
        cursors.closed = true;
        self.readable.notify_all();
        Ok(())
    }

    /// Number of committed elements not yet read.
    pub fn available(&self) -> Result<usize, BufferError> {
        Ok(self.lock_cursors()?.available)
    }

    /// Total number of elements lost to overwrites.
    pub fn overwritten(&self) -> Result<u64, BufferError> {
        Ok(self.lock_cursors()?.overwritten)
    }

    pub fn is_empty(&self) -> Result<bool, BufferError> {
        Ok(self.available()? == 0)
    }

    pub fn is_closed(&self) -> Result<bool, BufferError> {
        Ok(self.lock_cursors()?.closed)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn commit(&self) -> Result<(), BufferError> {
        let mut cursors = self.lock_cursors()?;
        if cursors.closed {
            return Ok(());
        }
        if cursors.available < self.capacity() {
            cursors.available += 1;
        }
        self.readable.notify_one();
        Ok(())
    }

    fn pop(&self, cursors: &mut MutexGuard<'_, Cursors>) -> Result<T, BufferError> {
        let index = cursors.head;
        let value = self.slots[index]
            .lock()
            .map_err(|_| BufferError::Poisoned)?
            .clone();
        cursors.head = (cursors.head + 1) % self.capacity();
        cursors.available -= 1;
        Ok(value)
    }

    fn lock_cursors(&self) -> Result<MutexGuard<'_, Cursors>, BufferError> {
        self.cursors.lock().map_err(|_| BufferError::Poisoned)
    }
}

impl<T: Clone + Default> RingBuffer<T> {
    /// Creates a buffer of `capacity` default-initialized slots.
    pub fn new(capacity: usize) -> Self {
        Self::from_fn(capacity, T::default)
    }
}

impl RingBuffer<Vec<f32>> {
    /// Creates a sample buffer with `capacity` slots of `element_size` zeros.
    pub fn with_element_size(capacity: usize, element_size: usize) -> Self {
        Self::from_fn(capacity, || vec![0.0; element_size])
    }
}

/// Handle to a slot acquired for writing.
///
/// Dropping the handle without calling [`commit`](Self::commit) leaves the
/// slot unpublished; the next acquire hands out the same slot again.
#[must_use = "a write slot is only visible to readers after commit()"]
pub struct WriteSlot<'a, T: Clone> {
    buffer: &'a RingBuffer<T>,
    index: usize,
}

impl<T: Clone> WriteSlot<'_, T> {
    /// Position of this slot in the buffer.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Writes into the slot. Only this slot's lock is held.
    pub fn fill<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Result<R, BufferError> {
        let mut slot = self.buffer.slots[self.index]
            .lock()
            .map_err(|_| BufferError::Poisoned)?;
        Ok(f(&mut slot))
    }

    /// Replaces the slot contents.
    pub fn write(&mut self, value: T) -> Result<(), BufferError> {
        self.fill(|slot| *slot = value)
    }

    /// Publishes the slot to the consumer and wakes one waiting reader.
    pub fn commit(self) -> Result<(), BufferError> {
        self.buffer.commit()
    }
}
