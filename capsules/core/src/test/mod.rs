// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Host-side stand-ins for the scheduler, pins and an SPI controller.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};
use std::boxed::Box;
use std::collections::HashMap;
use std::sync::{Condvar, Mutex, OnceLock};
use std::thread::{self, ThreadId};
use std::time::Duration;
use std::vec::Vec;

use kernel::hil::gpio;
use kernel::hil::spi::{Chunk, ChunkCompletion, Mode, SpiBusController};
use kernel::threads::{RawMutex, ThreadFlags, ThreadFlagsMask};
use kernel::ErrorCode;

/// Blocking lock built from a std mutex and condition variable.
#[derive(Default)]
pub(crate) struct StdMutex {
    locked: Mutex<bool>,
    released: Condvar,
}

impl RawMutex for StdMutex {
    fn lock(&self) {
        let mut locked = self.locked.lock().unwrap();
        while *locked {
            locked = self.released.wait(locked).unwrap();
        }
        *locked = true;
    }

    fn try_lock(&self) -> bool {
        let mut locked = self.locked.lock().unwrap();
        !core::mem::replace(&mut *locked, true)
    }

    fn unlock(&self) {
        *self.locked.lock().unwrap() = false;
        self.released.notify_one();
    }
}

/// Thread flags keyed by std thread id.
#[derive(Default)]
pub(crate) struct StdFlags {
    words: Mutex<HashMap<ThreadId, ThreadFlagsMask>>,
    changed: Condvar,
}

impl ThreadFlags for StdFlags {
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

/// A pin that remembers every level change.
#[derive(Default)]
pub(crate) struct FakePin {
    level: Cell<Option<bool>>,
    edges: std::cell::RefCell<Vec<bool>>,
    output: Cell<bool>,
}

impl FakePin {
    pub(crate) fn is_high(&self) -> bool {
        self.level.get() == Some(true)
    }

    pub(crate) fn edges(&self) -> Vec<bool> {
        self.edges.borrow().clone()
    }

    fn drive(&self, high: bool) {
        if self.level.replace(Some(high)) != Some(high) {
            self.edges.borrow_mut().push(high);
        }
    }
}

impl gpio::Configure for FakePin {
    fn configuration(&self) -> gpio::Configuration {
        if self.output.get() {
            gpio::Configuration::Output
        } else {
            gpio::Configuration::Unknown
        }
    }

    fn make_output(&self) -> gpio::Configuration {
        self.output.set(true);
        gpio::Configuration::Output
    }

    fn make_input(&self) -> gpio::Configuration {
        self.output.set(false);
        gpio::Configuration::Input
    }
}

impl gpio::Output for FakePin {
    fn set(&self) {
        self.drive(true);
    }

    fn clear(&self) {
        self.drive(false);
    }

    fn toggle(&self) -> bool {
        let high = !self.is_high();
        self.drive(high);
        high
    }
}

impl gpio::Input for FakePin {
    fn read(&self) -> bool {
        self.is_high()
    }
}

impl gpio::Pin for FakePin {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Init,
    Configure(Mode, u32),
    Shutdown,
    Chunk {
        len: usize,
        single_byte: bool,
        tx: Option<Vec<u8>>,
        tx_addr: Option<usize>,
    },
}

/// Controller that answers every byte with its complement and raises its
/// completion interrupt before the caller starts waiting.
pub(crate) struct FakeController {
    calls: Mutex<Vec<Call>>,
    reachable: AtomicBool,
    hang: AtomicBool,
    pending: AtomicBool,
    irq: OnceLock<Box<dyn Fn() + Send + Sync>>,
}

impl Default for FakeController {
    fn default() -> Self {
        FakeController {
            calls: Mutex::new(Vec::new()),
            reachable: AtomicBool::new(true),
            hang: AtomicBool::new(false),
            pending: AtomicBool::new(false),
            irq: OnceLock::new(),
        }
    }
}

impl FakeController {
    pub(crate) fn on_interrupt(&self, irq: impl Fn() + Send + Sync + 'static) {
        let _ = self.irq.set(Box::new(irq));
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub(crate) fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// While set, chunks never complete.
    pub(crate) fn set_hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SpiBusController for FakeController {
    const MAX_CHUNK: usize = 16;

    fn init(&self) {
        self.record(Call::Init);
    }

    fn configure(&self, mode: Mode, rate_hz: u32) -> Result<u32, ErrorCode> {
        self.record(Call::Configure(mode, rate_hz));
        Ok(rate_hz)
    }

    fn shutdown(&self) {
        self.record(Call::Shutdown);
    }

    fn is_dma_reachable(&self, _buf: &[u8]) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    fn transfer_chunk(
        &self,
        chunk: Chunk<'_>,
        completion: &dyn ChunkCompletion,
    ) -> Result<(), ErrorCode> {
        assert!(chunk.len <= Self::MAX_CHUNK);
        self.record(Call::Chunk {
            len: chunk.len,
            single_byte: chunk.single_byte,
            tx: chunk.tx.map(|b| b.to_vec()),
            tx_addr: chunk.tx.map(|b| b.as_ptr() as usize),
        });
        if let Some(rx) = chunk.rx {
            for (i, byte) in rx.iter_mut().enumerate() {
                *byte = !chunk.tx.map_or(0, |b| b[i]);
            }
        }

        let hang = self.hang.load(Ordering::SeqCst);
        if chunk.single_byte {
            return completion.spin_until(&mut || !hang);
        }
        completion.prepare();
        self.pending.store(true, Ordering::SeqCst);
        if !hang {
            if let Some(irq) = self.irq.get() {
                irq();
            }
        }
        completion.wait()
    }

    fn handle_interrupt(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }
}
