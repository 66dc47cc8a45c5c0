//! The circular queue: chain, storage and the two cursors.
//!
//! # Overview
//! - Fixed capacity `N`, set at compile time; slots come from a [`Storage`].
//! - Exactly one [`Reader`] and one [`Writer`], each starting at a configured node.
//! - No push/pop and no fill tracking. Traffic goes through the cursors, and callers detect
//!   overtaking with the cursor comparisons (or use [`BoundedQueue`](crate::BoundedQueue)).
//!
//! # Capacity misuse
//! Advancing the writer past unread data overwrites it, and advancing the reader past the
//! writer re-reads stale values. The queue does not detect either.

use core::marker::PhantomData;

use crossbeam_utils::CachePadded;

use crate::chain::Chain;
use crate::cursor::{CursorState, Reader, Writer};
use crate::error::{BuildError, CursorKind};
use crate::storage::{InlineStorage, Storage};
use crate::trace::{debug, warn};

/// Start nodes for the two cursors. Both default to node 0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueConfig {
    pub reader_start: usize,
    pub writer_start: usize,
}

impl QueueConfig {
    pub const fn new() -> Self {
        Self {
            reader_start: 0,
            writer_start: 0,
        }
    }

    pub const fn reader_at(mut self, node: usize) -> Self {
        self.reader_start = node;
        self
    }

    pub const fn writer_at(mut self, node: usize) -> Self {
        self.writer_start = node;
        self
    }
}

/// Fixed-capacity ring of `N` slots traversed by one reader and one writer.
pub struct CircularQueue<T, const N: usize, S = InlineStorage<T, N>> {
    chain: Chain<N>,
    storage: S,
    reader: CachePadded<CursorState>,
    writer: CachePadded<CursorState>,
    _values: PhantomData<T>,
}

// SAFETY: cursor positions are guarded by their spinlocks. Slot access is either `unsafe`
// with a caller-provided ordering contract or goes through `BoundedQueue`, and values only
// leave the queue by copy, so `T: Send` suffices. `S: Sync` covers concurrent `slots` calls.
unsafe impl<T: Send, const N: usize, S: Storage<T> + Send + Sync> Sync
    for CircularQueue<T, N, S>
{
}

impl<T: Default, const N: usize> CircularQueue<T, N> {
    /// Queue with inline storage filled with `T::default()`.
    pub fn new() -> Result<Self, BuildError> {
        Self::with_storage(InlineStorage::default())
    }
}

impl<T, const N: usize> CircularQueue<T, N> {
    pub fn from_array(values: [T; N]) -> Result<Self, BuildError> {
        Self::with_storage(InlineStorage::from_array(values))
    }
}

impl<T, const N: usize, S: Storage<T>> CircularQueue<T, N, S> {
    /// Queue over `storage` with both cursors at node 0.
    pub fn with_storage(storage: S) -> Result<Self, BuildError> {
        Self::with_config(storage, QueueConfig::new())
    }

    pub fn with_config(storage: S, config: QueueConfig) -> Result<Self, BuildError> {
        let chain = Chain::<N>::build().ok_or_else(|| {
            warn!("rejecting zero-capacity queue");
            BuildError::ZeroCapacity
        })?;

        let actual = storage.slots().len();
        if actual != N {
            warn!(expected = N, actual, "storage length mismatch");
            return Err(BuildError::StorageLength {
                expected: N,
                actual,
            });
        }

        for (cursor, start) in [
            (CursorKind::Reader, config.reader_start),
            (CursorKind::Writer, config.writer_start),
        ] {
            if start >= N {
                warn!(%cursor, start, capacity = N, "start node out of range");
                return Err(BuildError::StartOutOfRange {
                    cursor,
                    start,
                    capacity: N,
                });
            }
        }

        debug_assert!(chain.is_single_cycle());
        debug!(
            capacity = N,
            reader = config.reader_start,
            writer = config.writer_start,
            "circular queue built"
        );

        Ok(Self {
            chain,
            storage,
            reader: CachePadded::new(CursorState::new(config.reader_start)),
            writer: CachePadded::new(CursorState::new(config.writer_start)),
            _values: PhantomData,
        })
    }

    #[inline]
    pub fn reader(&self) -> Reader<'_, T, N, S> {
        Reader::of(self)
    }

    #[inline]
    pub fn writer(&self) -> Writer<'_, T, N, S> {
        Writer::of(self)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    #[inline(always)]
    pub(crate) fn slot_ptr(&self, node: usize) -> *mut T {
        self.storage.slots()[self.chain.node(node).slot()].as_ptr()
    }
}

impl<T, const N: usize, S> CircularQueue<T, N, S> {
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline(always)]
    pub fn chain(&self) -> &Chain<N> {
        &self.chain
    }

    #[inline(always)]
    pub(crate) fn reader_state(&self) -> &CursorState {
        &self.reader
    }

    #[inline(always)]
    pub(crate) fn writer_state(&self) -> &CursorState {
        &self.writer
    }

    /// Both cursors on the same node, checked under both locks (reader first).
    #[inline]
    pub(crate) fn cursors_meet(&self) -> bool {
        let reader = self.reader.hold();
        let writer = self.writer.hold();
        reader.position() == writer.position()
    }
}
