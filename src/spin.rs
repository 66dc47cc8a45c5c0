//! Test-and-test-and-set spinlock guarding cursor movement.
//!
//! # Semantics
//! - `lock` busy-waits; it never parks the thread.
//! - A successful acquire uses `Acquire` ordering and the release uses `Release`, so every
//!   write made while the lock was held is visible to the next holder.
//! - While the flag reads set, waiters spin on a `Relaxed` load and only retry the exchange
//!   once it reads clear. This keeps the cache line shared instead of bouncing it between cores.
//!
//! # Preconditions
//! The lock is **not reentrant**. Locking it a second time from the thread that already holds
//! it spins forever. Nothing detects or reports this.
//! It is also unfair: a waiter can starve under sustained contention.

use crate::sync::{AtomicBool, Ordering, spin_loop};

/// A bare mutual-exclusion flag with no protected payload.
pub struct SpinLock {
    locked: AtomicBool,
}

/// Holds a [`SpinLock`] until dropped or explicitly unlocked.
#[must_use = "dropping the guard releases the lock immediately"]
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl SpinLock {
    pub fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Acquire the lock, spinning until it is free.
    #[inline]
    pub fn lock(&self) -> SpinGuard<'_> {
        while self.locked.swap(true, Ordering::Acquire) {
            self.wait_until_clear();
        }
        SpinGuard { lock: self }
    }

    #[cfg(not(loom))]
    #[inline(always)]
    fn wait_until_clear(&self) {
        while self.locked.load(Ordering::Relaxed) {
            spin_loop();
        }
    }

    // Loom may serve a relaxed load the stale value forever; yield and go back to the swap.
    #[cfg(loom)]
    #[inline(always)]
    fn wait_until_clear(&self) {
        spin_loop();
    }

    /// Acquire the lock only if it is free right now.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinGuard<'_>> {
        if self.locked.swap(true, Ordering::Acquire) {
            None
        } else {
            Some(SpinGuard { lock: self })
        }
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Clear the flag without a guard.
    ///
    /// # Safety
    /// The caller must currently own the lock through a guard that has been forgotten
    /// (for example with [`core::mem::forget`]). Clearing a lock someone else holds breaks
    /// mutual exclusion for whatever it protects.
    #[inline]
    pub unsafe fn force_unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinGuard<'_> {
    /// Release the lock now. Equivalent to dropping the guard.
    #[inline]
    pub fn unlock(self) {
        drop(self);
    }
}

impl Drop for SpinGuard<'_> {
    #[inline]
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::SpinLock;
    use core::cell::UnsafeCell;
    use std::thread;

    struct Counter {
        lock: SpinLock,
        value: UnsafeCell<usize>,
    }

    // SAFETY: `value` is only touched while `lock` is held.
    unsafe impl Sync for Counter {}

    #[test]
    fn guard_drop_releases() {
        let lock = SpinLock::new();
        {
            let _guard = lock.lock();
            assert!(lock.is_locked());
        }
        assert!(!lock.is_locked());
    }

    #[test]
    fn explicit_unlock_releases() {
        let lock = SpinLock::new();
        let guard = lock.lock();
        guard.unlock();
        assert!(!lock.is_locked());
    }

    #[test]
    fn try_lock_fails_while_held() {
        let lock = SpinLock::new();
        let guard = lock.lock();
        assert!(lock.try_lock().is_none());
        drop(guard);
        assert!(lock.try_lock().is_some());
    }

    #[test]
    fn force_unlock_after_forget() {
        let lock = SpinLock::new();
        core::mem::forget(lock.lock());
        assert!(lock.is_locked());
        // SAFETY: the only guard was forgotten above and nobody else holds the lock.
        unsafe { lock.force_unlock() };
        assert!(!lock.is_locked());
    }

    #[test]
    fn serializes_increments() {
        let counter = Counter {
            lock: SpinLock::new(),
            value: UnsafeCell::new(0),
        };

        let shared = &counter;
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(move || {
                    let counter = shared;
                    for _ in 0..10_000 {
                        let _guard = counter.lock.lock();
                        // SAFETY: the guard grants exclusive access.
                        unsafe { *counter.value.get() += 1 };
                    }
                });
            }
        });

        assert_eq!(counter.value.into_inner(), 80_000);
    }
}
