//! Backing storage strategies for the queue's slots.
//!
//! The queue never allocates. It reaches values through a [`Storage`], which can own an inline
//! array, borrow a caller's slice, or (with the `alloc` feature) own a heap slice.
//! Every slot always holds an initialized `T`.

use core::cell::UnsafeCell;

/// One value location, addressed by exactly one chain node.
#[repr(transparent)]
pub struct Slot<T> {
    value: UnsafeCell<T>,
}

impl<T> Slot<T> {
    #[inline]
    pub const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    #[inline]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    #[inline(always)]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.value.get()
    }
}

// SAFETY: outside the crate a shared `Slot` exposes no access to its value; `get_mut` and
// `into_inner` need ownership. Inside the crate every access through `as_ptr` is ordered by a
// cursor lock plus either the caller's `unsafe` contract or the bounded layer's counter.
unsafe impl<T: Send> Sync for Slot<T> {}

impl<T: Default> Default for Slot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Source of the queue's slot array.
///
/// A queue is only `Sync` when its storage is `Sync`, because cursors on different threads
/// call [`slots`](Storage::slots) concurrently under different locks.
///
/// ```compile_fail
/// use core::cell::Cell;
/// use ph_circular::{BoundedQueue, Slot, Storage};
///
/// struct Counting {
///     slots: [Slot<u64>; 4],
///     calls: Cell<u64>,
/// }
///
/// unsafe impl Storage<u64> for Counting {
///     fn slots(&self) -> &[Slot<u64>] {
///         self.calls.set(self.calls.get() + 1);
///         &self.slots
///     }
/// }
///
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<BoundedQueue<u64, 4, Counting>>();
/// ```
///
/// # Safety
/// Implementors must return the same slice, at the same address and of the same length, from
/// every call to [`slots`](Storage::slots) for as long as the storage lives. No other live
/// reference may reach the values behind those slots while the storage exists, since the queue
/// reads and writes them through shared references. If the storage is `Sync`, `slots` must be
/// safe to call from several threads at once.
pub unsafe trait Storage<T> {
    fn slots(&self) -> &[Slot<T>];
}

/// Slots held inline in the queue.
pub struct InlineStorage<T, const N: usize> {
    slots: [Slot<T>; N],
}

impl<T, const N: usize> InlineStorage<T, N> {
    pub fn from_array(values: [T; N]) -> Self {
        Self {
            slots: values.map(Slot::new),
        }
    }

    pub fn into_array(self) -> [T; N] {
        self.slots.map(Slot::into_inner)
    }
}

impl<T: Default, const N: usize> Default for InlineStorage<T, N> {
    fn default() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot::default()),
        }
    }
}

// SAFETY: the array lives inside `self` and is only handed out by shared reference.
unsafe impl<T, const N: usize> Storage<T> for InlineStorage<T, N> {
    #[inline(always)]
    fn slots(&self) -> &[Slot<T>] {
        &self.slots
    }
}

/// Slots living in a caller-owned slice, exclusively borrowed for `'a`.
pub struct ExternalStorage<'a, T> {
    slots: &'a [Slot<T>],
}

impl<'a, T> ExternalStorage<'a, T> {
    pub fn new(values: &'a mut [T]) -> Self {
        let len = values.len();
        let ptr = values.as_mut_ptr().cast::<Slot<T>>();
        // SAFETY: `Slot<T>` is `repr(transparent)` over `UnsafeCell<T>`, which has the same
        // layout as `T`. The exclusive borrow is held for `'a`, so nothing else reaches the
        // values while the slots are in use, and writing through the cells is allowed.
        let slots = unsafe { core::slice::from_raw_parts(ptr, len) };
        Self { slots }
    }
}

// SAFETY: the borrowed slice is fixed at construction and exclusively borrowed.
unsafe impl<T> Storage<T> for ExternalStorage<'_, T> {
    #[inline(always)]
    fn slots(&self) -> &[Slot<T>] {
        self.slots
    }
}

#[cfg(feature = "alloc")]
pub use boxed::BoxedStorage;

#[cfg(feature = "alloc")]
mod boxed {
    use super::{Slot, Storage};
    use alloc::boxed::Box;
    use alloc::vec::Vec;

    /// Slots in a single heap allocation made at construction.
    pub struct BoxedStorage<T> {
        slots: Box<[Slot<T>]>,
    }

    impl<T> BoxedStorage<T> {
        pub fn into_vec(self) -> Vec<T> {
            self.slots.into_vec().into_iter().map(Slot::into_inner).collect()
        }
    }

    impl<T> From<Vec<T>> for BoxedStorage<T> {
        fn from(values: Vec<T>) -> Self {
            Self {
                slots: values.into_iter().map(Slot::new).collect(),
            }
        }
    }

    impl<T> From<Box<[T]>> for BoxedStorage<T> {
        fn from(values: Box<[T]>) -> Self {
            Self::from(values.into_vec())
        }
    }

    // SAFETY: the boxed slice is never reallocated or replaced after construction.
    unsafe impl<T> Storage<T> for BoxedStorage<T> {
        #[inline(always)]
        fn slots(&self) -> &[Slot<T>] {
            &self.slots
        }
    }
}
