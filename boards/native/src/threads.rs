// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Host threads standing in for the RTOS: a blocking lock and per-thread
//! event flags.

use std::collections::HashMap;
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};
use std::time::Duration;

use kernel::threads::{RawMutex, ThreadFlags, ThreadFlagsMask};

/// Blocking lock. Waiters sleep on a condition variable.
#[derive(Default)]
pub struct NativeMutex {
    locked: Mutex<bool>,
    released: Condvar,
}

impl RawMutex for NativeMutex {
    fn lock(&self) {
        let locked = self.locked.lock().unwrap_or_else(PoisonError::into_inner);
        let mut locked = self
            .released
            .wait_while(locked, |locked| *locked)
            .unwrap_or_else(PoisonError::into_inner);
        *locked = true;
    }

    fn try_lock(&self) -> bool {
        let mut locked = self.locked.lock().unwrap_or_else(PoisonError::into_inner);
        !std::mem::replace(&mut *locked, true)
    }

    fn unlock(&self) {
        *self.locked.lock().unwrap_or_else(PoisonError::into_inner) = false;
        self.released.notify_one();
    }
}

/// One flag word per host thread.
#[derive(Default)]
pub struct NativeThreadFlags {
    words: Mutex<HashMap<ThreadId, ThreadFlagsMask>>,
    changed: Condvar,
}

impl NativeThreadFlags {
    /// Flags currently set for `thread`.
    pub fn pending(&self, thread: ThreadId) -> ThreadFlagsMask {
        let words = self.words.lock().unwrap_or_else(PoisonError::into_inner);
        words.get(&thread).copied().unwrap_or(0)
    }

    fn take_one(word: &mut ThreadFlagsMask, mask: ThreadFlagsMask) -> Option<ThreadFlagsMask> {
        let hit = *word & mask;
        if hit == 0 {
            return None;
        }
        let flag = hit & hit.wrapping_neg();
        *word &= !flag;
        Some(flag)
    }
}

impl ThreadFlags for NativeThreadFlags {
    type ThreadId = ThreadId;

    fn current(&self) -> ThreadId {
        thread::current().id()
    }

    fn set(&self, thread: ThreadId, mask: ThreadFlagsMask) {
        *self
            .words
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(thread)
            .or_insert(0) |= mask;
        self.changed.notify_all();
    }

    fn wait_one(&self, mask: ThreadFlagsMask) -> ThreadFlagsMask {
        let me = self.current();
        let words = self.words.lock().unwrap_or_else(PoisonError::into_inner);
        let mut words = self
            .changed
            .wait_while(words, |w| w.get(&me).copied().unwrap_or(0) & mask == 0)
            .unwrap_or_else(PoisonError::into_inner);
        let word = words.entry(me).or_insert(0);
        Self::take_one(word, mask).unwrap_or(0)
    }

    fn wait_one_timeout(&self, mask: ThreadFlagsMask, timeout_ms: u32) -> Option<ThreadFlagsMask> {
        let me = self.current();
        let words = self.words.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut words, _) = self
            .changed
            .wait_timeout_while(words, Duration::from_millis(timeout_ms.into()), |w| {
                w.get(&me).copied().unwrap_or(0) & mask == 0
            })
            .unwrap_or_else(PoisonError::into_inner);
        Self::take_one(words.entry(me).or_insert(0), mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::threads::THREAD_FLAG_SPI_BUS;
    use std::sync::Arc;

    #[test]
    fn flag_set_from_another_thread_wakes_waiter() {
        let flags = Arc::new(NativeThreadFlags::default());
        let me = flags.current();
        let isr = Arc::clone(&flags);
        let handle = thread::spawn(move || isr.set(me, THREAD_FLAG_SPI_BUS | 1));
        assert_eq!(flags.wait_one(THREAD_FLAG_SPI_BUS), THREAD_FLAG_SPI_BUS);
        handle.join().unwrap();
        assert_eq!(flags.pending(me), 1);
    }

    #[test]
    fn timeout_leaves_flags_untouched() {
        let flags = NativeThreadFlags::default();
        assert_eq!(flags.wait_one_timeout(THREAD_FLAG_SPI_BUS, 5), None);
        flags.set(flags.current(), THREAD_FLAG_SPI_BUS);
        assert_eq!(
            flags.wait_one_timeout(THREAD_FLAG_SPI_BUS, 5),
            Some(THREAD_FLAG_SPI_BUS)
        );
        assert_eq!(flags.pending(flags.current()), 0);
    }

    #[test]
    fn mutex_blocks_second_locker() {
        let mutex = Arc::new(NativeMutex::default());
        mutex.lock();
        assert!(!mutex.try_lock());
        let other = Arc::clone(&mutex);
        let handle = thread::spawn(move || {
            other.lock();
            other.unlock();
        });
        mutex.unlock();
        handle.join().unwrap();
        assert!(mutex.try_lock());
    }
}
