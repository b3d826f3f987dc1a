// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interrupt controller model.
//!
//! Raising an enabled line calls the board's `InterruptService` on the
//! raising thread, the way a handler preempts whatever is running. A
//! disabled line latches the interrupt until it is enabled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use kernel::debug;
use kernel::platform::{InterruptLine, InterruptService};

pub struct SimNvic {
    enabled: AtomicU64,
    pending: AtomicU64,
    service: OnceLock<&'static (dyn InterruptService + Sync)>,
}

impl SimNvic {
    pub const fn new() -> SimNvic {
        SimNvic {
            enabled: AtomicU64::new(0),
            pending: AtomicU64::new(0),
            service: OnceLock::new(),
        }
    }

    /// Route interrupts to `service`. Only the first call has an effect.
    pub fn set_service(&self, service: &'static (dyn InterruptService + Sync)) {
        let _ = self.service.set(service);
    }

    pub fn line(&'static self, interrupt: u32) -> SimLine {
        SimLine {
            nvic: self,
            interrupt,
        }
    }

    /// Assert `interrupt`. Returns whether a handler ran and claimed it.
    /// A disabled line stays pending.
    pub fn raise(&self, interrupt: u32) -> bool {
        let bit = 1 << interrupt;
        if self.enabled.load(Ordering::SeqCst) & bit == 0 {
            self.pending.fetch_or(bit, Ordering::SeqCst);
            return false;
        }
        match self.service.get() {
            Some(service) => {
                let handled = service.service_interrupt(interrupt);
                if !handled {
                    debug!("nvic: unhandled interrupt {}", interrupt);
                }
                handled
            }
            None => false,
        }
    }

    pub fn is_pending(&self, interrupt: u32) -> bool {
        self.pending.load(Ordering::SeqCst) & (1 << interrupt) != 0
    }
}

/// One line of a [`SimNvic`].
pub struct SimLine {
    nvic: &'static SimNvic,
    interrupt: u32,
}

impl InterruptLine for SimLine {
    /// A line raised while disabled is delivered as soon as it is enabled.
    fn enable(&self) {
        let bit = 1 << self.interrupt;
        self.nvic.enabled.fetch_or(bit, Ordering::SeqCst);
        if self.nvic.pending.fetch_and(!bit, Ordering::SeqCst) & bit != 0 {
            self.nvic.raise(self.interrupt);
        }
    }

    fn disable(&self) {
        self.nvic
            .enabled
            .fetch_and(!(1 << self.interrupt), Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.nvic.enabled.load(Ordering::SeqCst) & (1 << self.interrupt) != 0
    }
}
