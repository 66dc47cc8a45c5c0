//! Fixed-capacity circular queue with spinlock-guarded reader and writer cursors.
//!
//! # Highlights
//! - `N` slots wired into an index-addressed circular chain; no allocation after construction.
//! - One reader and one writer cursor per queue, each guarded by its own spinlock.
//! - Cursors compare by node identity so callers can build their own full/empty checks.
//! - Opt-in [`BoundedQueue`] layer with a fill counter and safe `try_push`/`try_pop`.
//!
//! # Quick start
//! ```
//! use ph_circular::CircularQueue;
//!
//! let ring = CircularQueue::<u32, 4>::new()?;
//! let writer = ring.writer();
//! let reader = ring.reader();
//!
//! // SAFETY: single thread, so every write finishes before the read of the same slot.
//! unsafe {
//!     writer.write(42).advance();
//!     assert_eq!(reader.read(), 42);
//! }
//! reader.advance();
//! assert!(reader == writer);
//! # Ok::<(), ph_circular::BuildError>(())
//! ```
//!
//! With fill tracking:
//! ```
//! use ph_circular::{BoundedQueue, CircularQueue};
//!
//! let queue = BoundedQueue::new(CircularQueue::<u32, 2>::new()?)?;
//! assert_eq!(queue.try_push(1), Ok(()));
//! assert_eq!(queue.try_push(2), Ok(()));
//! assert_eq!(queue.try_push(3), Err(3));
//! assert_eq!(queue.try_pop(), Some(1));
//! # Ok::<(), ph_circular::BuildError>(())
//! ```
//!
//! # No-std
//! The crate is `#![no_std]`. The `alloc` feature adds heap-backed `BoxedStorage`. Tests require `std`.
//!
//! # Safety and concurrency
//! - Advancing a cursor is linearized across every thread using that cursor. Many threads may
//!   share the reader; they compete for values rather than each seeing all of them.
//! - The reader and writer locks are independent. Only reader/writer comparisons take both,
//!   always reader first.
//! - Slot contents are **not** synchronized by the core queue. Raw slot access through the
//!   cursors is `unsafe` and the caller orders writes before reads.
//! - Spinlocks are not reentrant; a thread that locks a cursor twice spins forever.
//!
//! # Semantics
//! - Both cursors start at node 0 unless [`QueueConfig`] says otherwise.
//! - Nothing stops the writer from lapping the reader or the reader from passing the writer.
//! - Construction with `N == 0`, mis-sized storage or an out-of-range start fails with
//!   [`BuildError`].
#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod sync;
mod trace;

pub mod bounded;
pub mod chain;
pub mod cursor;
pub mod error;
pub mod queue;
pub mod spin;
pub mod storage;

pub use bounded::BoundedQueue;
pub use chain::{Chain, Node};
pub use cursor::{Reader, Writer};
pub use error::{BuildError, CursorKind};
pub use queue::{CircularQueue, QueueConfig};
pub use spin::{SpinGuard, SpinLock};
#[cfg(feature = "alloc")]
pub use storage::BoxedStorage;
pub use storage::{ExternalStorage, InlineStorage, Slot, Storage};
