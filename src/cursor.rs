//! Reader and writer cursors.
//!
//! A cursor is a node index plus a private [`SpinLock`]. The queue owns both cursors; the
//! [`Reader`] and [`Writer`] handles are shared references to that state, so every handle of
//! one kind drives the same logical position. Concurrent advances through the same cursor
//! linearize, which gives competing-consumer (and competing-producer) behavior.
//!
//! # Slot access
//! Moving a cursor is synchronized; touching the slot under it is not. `read`, `write`,
//! `consume` and `produce` are `unsafe` because the caller must order every write of a slot
//! before any read of it and keep reads and writes of one slot from overlapping.
//! [`BoundedQueue`](crate::BoundedQueue) is a safe layer that does this with a fill counter.
//!
//! # Comparison
//! `==` compares node identity. Comparing a reader with a writer takes the reader lock and
//! then the writer lock, always in that order, so opposite-role comparisons cannot deadlock.
//! Cursors of different queues are never equal.

use core::fmt;

use crate::queue::CircularQueue;
use crate::spin::{SpinGuard, SpinLock};
use crate::storage::{InlineStorage, Storage};
use crate::sync::{AtomicUsize, Ordering};

pub(crate) struct CursorState {
    position: AtomicUsize,
    lock: SpinLock,
}

/// A cursor locked for the duration of the borrow.
pub(crate) struct Held<'a> {
    position: &'a AtomicUsize,
    _guard: SpinGuard<'a>,
}

impl CursorState {
    pub(crate) fn new(start: usize) -> Self {
        Self {
            position: AtomicUsize::new(start),
            lock: SpinLock::new(),
        }
    }

    #[inline]
    pub(crate) fn hold(&self) -> Held<'_> {
        let guard = self.lock.lock();
        Held {
            position: &self.position,
            _guard: guard,
        }
    }
}

impl Held<'_> {
    // Relaxed is enough: the lock's acquire/release orders every access.
    #[inline(always)]
    pub(crate) fn position(&self) -> usize {
        self.position.load(Ordering::Relaxed)
    }

    #[inline(always)]
    pub(crate) fn set(&self, node: usize) {
        self.position.store(node, Ordering::Relaxed);
    }
}

/// Consuming cursor of a [`CircularQueue`].
pub struct Reader<'a, T, const N: usize, S = InlineStorage<T, N>> {
    queue: &'a CircularQueue<T, N, S>,
}

/// Producing cursor of a [`CircularQueue`].
pub struct Writer<'a, T, const N: usize, S = InlineStorage<T, N>> {
    queue: &'a CircularQueue<T, N, S>,
}

impl<'a, T, const N: usize, S: Storage<T>> Reader<'a, T, N, S> {
    /// The queue's one reader.
    #[inline]
    pub fn of(queue: &'a CircularQueue<T, N, S>) -> Self {
        Self { queue }
    }

    /// Node index the reader currently sits on.
    #[inline]
    pub fn position(&self) -> usize {
        self.queue.reader_state().hold().position()
    }

    /// Step to the next node.
    #[inline]
    pub fn advance(&self) -> &Self {
        let held = self.queue.reader_state().hold();
        held.set(self.queue.chain().node(held.position()).next());
        self
    }

    /// Copy of the value at the current node.
    ///
    /// # Safety
    /// The last write to this slot must happen-before this call, and no write to the slot may
    /// run concurrently with it.
    #[inline]
    pub unsafe fn read(&self) -> T
    where
        T: Copy,
    {
        let held = self.queue.reader_state().hold();
        // SAFETY: the caller guarantees no write to this slot races with the read.
        unsafe { self.queue.slot_ptr(held.position()).read() }
    }

    /// Read the current value and advance in one critical section.
    ///
    /// Concurrent consumers calling this each receive a different slot.
    ///
    /// # Safety
    /// Same contract as [`read`](Self::read).
    #[inline]
    pub unsafe fn consume(&self) -> T
    where
        T: Copy,
    {
        let held = self.queue.reader_state().hold();
        let at = held.position();
        // SAFETY: the caller guarantees no write to this slot races with the read.
        let value = unsafe { self.queue.slot_ptr(at).read() };
        held.set(self.queue.chain().node(at).next());
        value
    }
}

impl<'a, T, const N: usize, S: Storage<T>> Writer<'a, T, N, S> {
    /// The queue's one writer.
    #[inline]
    pub fn of(queue: &'a CircularQueue<T, N, S>) -> Self {
        Self { queue }
    }

    /// Node index the writer currently sits on.
    #[inline]
    pub fn position(&self) -> usize {
        self.queue.writer_state().hold().position()
    }

    /// Step to the next node.
    #[inline]
    pub fn advance(&self) -> &Self {
        let held = self.queue.writer_state().hold();
        held.set(self.queue.chain().node(held.position()).next());
        self
    }

    /// Store `value` in the slot at the writer's current node, dropping the old value.
    ///
    /// # Safety
    /// No read or other write of this slot may run concurrently with this call.
    #[inline]
    pub unsafe fn write(&self, value: T) -> &Self {
        let held = self.queue.writer_state().hold();
        // SAFETY: the caller guarantees exclusive access to this slot for the store.
        unsafe { *self.queue.slot_ptr(held.position()) = value };
        self
    }

    /// Write `value` and advance in one critical section.
    ///
    /// # Safety
    /// Same contract as [`write`](Self::write).
    #[inline]
    pub unsafe fn produce(&self, value: T) {
        let held = self.queue.writer_state().hold();
        let at = held.position();
        // SAFETY: the caller guarantees exclusive access to this slot for the store.
        unsafe { *self.queue.slot_ptr(at) = value };
        held.set(self.queue.chain().node(at).next());
    }
}

impl<T, const N: usize, S> Clone for Reader<'_, T, N, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize, S> Copy for Reader<'_, T, N, S> {}

impl<T, const N: usize, S> Clone for Writer<'_, T, N, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize, S> Copy for Writer<'_, T, N, S> {}

// A queue has one reader, so two readers of the same queue are the same cursor.
impl<'b, T, const N: usize, S> PartialEq<Reader<'b, T, N, S>> for Reader<'_, T, N, S> {
    #[inline]
    fn eq(&self, other: &Reader<'b, T, N, S>) -> bool {
        core::ptr::eq(self.queue, other.queue)
    }
}

impl<'b, T, const N: usize, S> PartialEq<Writer<'b, T, N, S>> for Writer<'_, T, N, S> {
    #[inline]
    fn eq(&self, other: &Writer<'b, T, N, S>) -> bool {
        core::ptr::eq(self.queue, other.queue)
    }
}

impl<'b, T, const N: usize, S> PartialEq<Writer<'b, T, N, S>> for Reader<'_, T, N, S> {
    #[inline]
    fn eq(&self, other: &Writer<'b, T, N, S>) -> bool {
        core::ptr::eq(self.queue, other.queue) && self.queue.cursors_meet()
    }
}

impl<'b, T, const N: usize, S> PartialEq<Reader<'b, T, N, S>> for Writer<'_, T, N, S> {
    #[inline]
    fn eq(&self, other: &Reader<'b, T, N, S>) -> bool {
        core::ptr::eq(self.queue, other.queue) && self.queue.cursors_meet()
    }
}

impl<T, const N: usize, S: Storage<T>> fmt::Debug for Reader<'_, T, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("position", &self.position())
            .finish()
    }
}

impl<T, const N: usize, S: Storage<T>> fmt::Debug for Writer<'_, T, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("position", &self.position())
            .finish()
    }
}
