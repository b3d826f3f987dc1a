// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! PPI register file with the `CHENSET`/`CHENCLR` side effects of the real
//! peripheral.

use std::sync::atomic::{AtomicU32, Ordering};

use nrf52::ppi::{PpiRegisterBlock, NUM_CONFIGURABLE_CHANNELS};

pub struct SimPpi {
    chen: AtomicU32,
    eep: [AtomicU32; NUM_CONFIGURABLE_CHANNELS],
    tep: [AtomicU32; NUM_CONFIGURABLE_CHANNELS],
}

impl SimPpi {
    pub fn new() -> SimPpi {
        SimPpi {
            chen: AtomicU32::new(0),
            eep: std::array::from_fn(|_| AtomicU32::new(0)),
            tep: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }
}

impl PpiRegisterBlock for SimPpi {
    fn set_endpoints(&self, channel: usize, event: u32, task: u32) {
        self.eep[channel].store(event, Ordering::SeqCst);
        self.tep[channel].store(task, Ordering::SeqCst);
    }

    fn event_endpoint(&self, channel: usize) -> u32 {
        self.eep[channel].load(Ordering::SeqCst)
    }

    fn task_endpoint(&self, channel: usize) -> u32 {
        self.tep[channel].load(Ordering::SeqCst)
    }

    fn enable_channels(&self, mask: u32) {
        self.chen.fetch_or(mask, Ordering::SeqCst);
    }

    fn disable_channels(&self, mask: u32) {
        self.chen.fetch_and(!mask, Ordering::SeqCst);
    }

    fn enabled_channels(&self) -> u32 {
        self.chen.load(Ordering::SeqCst)
    }
}
