//! Opt-in fill tracking over a [`CircularQueue`].
//!
//! [`BoundedQueue`] takes ownership of a queue whose cursors start on the same node and adds an
//! atomic fill counter. `try_push` holds the writer lock across the counter check, the slot
//! write and the advance; `try_pop` does the same under the reader lock. The counter's
//! release/acquire pairs order each slot write before its read and each read before the slot
//! is reused, so both operations are safe.
//!
//! Multiple producers and multiple consumers may share one `BoundedQueue`.

use crossbeam_utils::CachePadded;

use crate::error::BuildError;
use crate::queue::CircularQueue;
use crate::storage::{InlineStorage, Storage};
use crate::sync::{AtomicUsize, Ordering};
use crate::trace::{trace, warn};

pub struct BoundedQueue<T, const N: usize, S = InlineStorage<T, N>> {
    queue: CircularQueue<T, N, S>,
    len: CachePadded<AtomicUsize>,
}

impl<T, const N: usize, S: Storage<T>> BoundedQueue<T, N, S> {
    /// Wrap `queue`. Fails if its reader and writer are on different nodes.
    pub fn new(queue: CircularQueue<T, N, S>) -> Result<Self, BuildError> {
        let reader = queue.reader().position();
        let writer = queue.writer().position();
        if reader != writer {
            warn!(reader, writer, "bounded queue needs cursors on one node");
            return Err(BuildError::CursorsApart { reader, writer });
        }
        Ok(Self {
            queue,
            len: CachePadded::new(AtomicUsize::new(0)),
        })
    }

    /// Write `value` at the writer and advance, or hand it back if every slot is unread.
    pub fn try_push(&self, value: T) -> Result<(), T> {
        let held = self.queue.writer_state().hold();
        if self.len.load(Ordering::Acquire) == N {
            trace!(capacity = N, "push rejected, queue full");
            return Err(value);
        }
        let at = held.position();
        // SAFETY: `len < N` was observed after the pop that last read this slot released it,
        // and no reader touches a slot until the increment below publishes it.
        unsafe { *self.queue.slot_ptr(at) = value };
        held.set(self.queue.chain().node(at).next());
        self.len.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Copy the value at the reader and advance, or `None` if nothing is unread.
    pub fn try_pop(&self) -> Option<T>
    where
        T: Copy,
    {
        let held = self.queue.reader_state().hold();
        if self.len.load(Ordering::Acquire) == 0 {
            return None;
        }
        let at = held.position();
        // SAFETY: `len > 0` was observed after the push that filled this slot published it,
        // and no writer reuses the slot until the decrement below releases it.
        let value = unsafe { self.queue.slot_ptr(at).read() };
        held.set(self.queue.chain().node(at).next());
        self.len.fetch_sub(1, Ordering::Release);
        Some(value)
    }

    /// Unread values at the time of the call.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Give the queue back. Unread values stay in their slots.
    pub fn into_inner(self) -> CircularQueue<T, N, S> {
        self.queue
    }
}
