// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Blocking primitives that thread-context drivers are written against.
//!
//! The scheduler itself lives outside this crate. A board supplies a
//! [`RawMutex`] (a blocking lock) and a [`ThreadFlags`] implementation (a
//! per-thread event word that interrupt handlers can post to). Drivers build
//! on top of those with [`Mutex`] and [`CompletionSignal`].

use core::cell::{Cell, UnsafeCell};
use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::ErrorCode;

/// Bit mask of thread flags.
pub type ThreadFlagsMask = u16;

/// Flag posted to a thread blocked on an SPI bus chunk completion.
pub const THREAD_FLAG_SPI_BUS: ThreadFlagsMask = 1 << 10;

/// A blocking lock without data.
///
/// `lock` must block the calling thread (not spin in interrupt context) until
/// the lock is free. Implementations must be usable from any thread.
pub trait RawMutex: Sync {
    /// Take the lock, blocking until it is available.
    fn lock(&self);

    /// Take the lock if it is free. Returns `true` on success.
    fn try_lock(&self) -> bool;

    /// Release the lock. Only the current holder may call this.
    fn unlock(&self);
}

/// A blocking mutex protecting a `T`.
pub struct Mutex<R: RawMutex, T> {
    raw: R,
    data: UnsafeCell<T>,
}

// Safety: access to `data` is serialized by `raw`.
unsafe impl<R: RawMutex, T: Send> Sync for Mutex<R, T> {}

impl<R: RawMutex + Default, T> Mutex<R, T> {
    pub fn new(data: T) -> Self {
        Self::with_raw(R::default(), data)
    }
}

impl<R: RawMutex, T> Mutex<R, T> {
    pub const fn with_raw(raw: R, data: T) -> Self {
        Mutex {
            raw,
            data: UnsafeCell::new(data),
        }
    }

    /// Block until the lock is held and return a guard releasing it on drop.
    pub fn lock(&self) -> MutexGuard<'_, R, T> {
        self.raw.lock();
        MutexGuard { mutex: self }
    }

    pub fn try_lock(&self) -> Option<MutexGuard<'_, R, T>> {
        if self.raw.try_lock() {
            Some(MutexGuard { mutex: self })
        } else {
            None
        }
    }
}

/// Proof that the mutex is held. Unlocks when dropped.
pub struct MutexGuard<'a, R: RawMutex, T> {
    mutex: &'a Mutex<R, T>,
}

impl<R: RawMutex, T> Deref for MutexGuard<'_, R, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Safety: the guard exists only while the lock is held.
        unsafe { &*self.mutex.data.get() }
    }
}

impl<R: RawMutex, T> DerefMut for MutexGuard<'_, R, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: the guard exists only while the lock is held, and `&mut
        // self` prevents aliasing through this guard.
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<R: RawMutex, T> Drop for MutexGuard<'_, R, T> {
    fn drop(&mut self) {
        self.mutex.raw.unlock();
    }
}

/// Per-thread event flags.
///
/// `set` may be called from interrupt context. `wait_one` blocks the calling
/// thread until any flag in `mask` is set, clears that flag, and returns it.
pub trait ThreadFlags: Sync {
    type ThreadId: Copy + Send + PartialEq + fmt::Debug;

    /// The thread calling this function.
    fn current(&self) -> Self::ThreadId;

    fn set(&self, thread: Self::ThreadId, mask: ThreadFlagsMask);

    fn wait_one(&self, mask: ThreadFlagsMask) -> ThreadFlagsMask;

    /// Like `wait_one`, but gives up after `timeout_ms` and returns `None`.
    fn wait_one_timeout(&self, mask: ThreadFlagsMask, timeout_ms: u32)
        -> Option<ThreadFlagsMask>;
}

/// Single-slot completion record: one thread waits, an interrupt wakes it.
///
/// The waiting thread calls [`CompletionSignal::prepare`] before starting the
/// hardware, then [`CompletionSignal::wait`]. The interrupt handler calls
/// [`CompletionSignal::signal`], which takes the recorded thread and posts the
/// flag to it.
pub struct CompletionSignal<'a, F: ThreadFlags> {
    flags: &'a F,
    flag: ThreadFlagsMask,
    waiter: critical_section::Mutex<Cell<Option<F::ThreadId>>>,
}

impl<'a, F: ThreadFlags> CompletionSignal<'a, F> {
    pub const fn new(flags: &'a F, flag: ThreadFlagsMask) -> Self {
        CompletionSignal {
            flags,
            flag,
            waiter: critical_section::Mutex::new(Cell::new(None)),
        }
    }

    /// Record the calling thread as the waiter.
    pub fn prepare(&self) {
        let current = self.flags.current();
        critical_section::with(|cs| self.waiter.borrow(cs).set(Some(current)));
    }

    /// Block until `signal` is called, or until `timeout_ms` elapses.
    ///
    /// On timeout the waiter record is cleared and `BUSY` is returned. If the
    /// interrupt won the race and already took the record, its flag is
    /// consumed and the wait succeeds.
    pub fn wait(&self, timeout_ms: Option<u32>) -> Result<(), ErrorCode> {
        match timeout_ms {
            None => {
                self.flags.wait_one(self.flag);
                Ok(())
            }
            Some(ms) => match self.flags.wait_one_timeout(self.flag, ms) {
                Some(_) => Ok(()),
                None if self.cancel() => Err(ErrorCode::BUSY),
                None => {
                    self.flags.wait_one(self.flag);
                    Ok(())
                }
            },
        }
    }

    /// Clear the waiter record. Returns `true` if a waiter was recorded.
    pub fn cancel(&self) -> bool {
        critical_section::with(|cs| self.waiter.borrow(cs).take()).is_some()
    }

    /// Wake the recorded waiter, if any. Returns `false` when no thread was
    /// waiting.
    pub fn signal(&self) -> bool {
        match critical_section::with(|cs| self.waiter.borrow(cs).take()) {
            Some(thread) => {
                self.flags.set(thread, self.flag);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| self.waiter.borrow(cs).get()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::boxed::Box;
    use std::collections::HashMap;
    use std::sync::{Arc, Condvar, Mutex as StdMutex};
    use std::thread::{self, ThreadId};
    use std::time::Duration;

    #[derive(Default)]
    struct SpinMutex(AtomicBool);

    impl RawMutex for SpinMutex {
        fn lock(&self) {
            while !self.try_lock() {
                thread::yield_now();
            }
        }

        fn try_lock(&self) -> bool {
            self.0
                .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
        }

        fn unlock(&self) {
            self.0.store(false, Ordering::Release);
        }
    }

    #[derive(Default)]
    struct Flags {
        words: StdMutex<HashMap<ThreadId, ThreadFlagsMask>>,
        changed: Condvar,
    }

    impl ThreadFlags for Flags {
        type ThreadId = ThreadId;

        fn current(&self) -> ThreadId {
            thread::current().id()
        }

        fn set(&self, thread: ThreadId, mask: ThreadFlagsMask) {
            *self.words.lock().unwrap().entry(thread).or_insert(0) |= mask;
            self.changed.notify_all();
        }

        fn wait_one(&self, mask: ThreadFlagsMask) -> ThreadFlagsMask {
            loop {
                if let Some(flag) = self.wait_one_timeout(mask, 1000) {
                    return flag;
                }
            }
        }

        fn wait_one_timeout(&self, mask: ThreadFlagsMask, timeout_ms: u32) -> Option<ThreadFlagsMask> {
            let me = self.current();
            let words = self.words.lock().unwrap();
            let (mut words, _) = self
                .changed
                .wait_timeout_while(words, Duration::from_millis(timeout_ms.into()), |w| {
                    w.get(&me).copied().unwrap_or(0) & mask == 0
                })
                .unwrap();
            let word = words.entry(me).or_insert(0);
            let hit = *word & mask;
            if hit == 0 {
                return None;
            }
            let flag = hit & hit.wrapping_neg();
            *word &= !flag;
            Some(flag)
        }
    }

    #[test]
    fn mutex_guard_unlocks_on_drop() {
        let m: Mutex<SpinMutex, u32> = Mutex::new(5);
        {
            let mut g = m.lock();
            *g += 1;
            assert!(m.try_lock().is_none());
        }
        assert_eq!(*m.try_lock().unwrap(), 6);
    }

    #[test]
    fn signal_wakes_prepared_thread() {
        let flags: &'static Flags = Box::leak(Box::default());
        let signal = Arc::new(CompletionSignal::new(flags, THREAD_FLAG_SPI_BUS));
        signal.prepare();
        assert!(signal.is_pending());

        let isr = Arc::clone(&signal);
        let handle = thread::spawn(move || isr.signal());
        assert_eq!(signal.wait(None), Ok(()));
        assert!(handle.join().unwrap());
        assert!(!signal.is_pending());
    }

    #[test]
    fn signal_without_waiter_is_spurious() {
        let flags = Flags::default();
        let signal = CompletionSignal::new(&flags, THREAD_FLAG_SPI_BUS);
        assert!(!signal.signal());
        assert!(!signal.cancel());
    }

    #[test]
    fn wait_times_out_and_clears_waiter() {
        let flags = Flags::default();
        let signal = CompletionSignal::new(&flags, THREAD_FLAG_SPI_BUS);
        signal.prepare();
        assert_eq!(signal.wait(Some(10)), Err(ErrorCode::BUSY));
        assert!(!signal.is_pending());
        // A late interrupt finds nobody to wake.
        assert!(!signal.signal());
    }

    #[test]
    fn signal_before_wait_is_not_lost() {
        let flags = Flags::default();
        let signal = CompletionSignal::new(&flags, THREAD_FLAG_SPI_BUS);
        signal.prepare();
        assert!(signal.signal());
        assert_eq!(signal.wait(Some(10)), Ok(()));
    }
}
