// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Programmable peripheral interconnect, nRF52
//!
//! The PPI provides a mechanism to automatically trigger a task in one
//! peripheral as a result of an event occurring in another peripheral. A task
//! is connected to an event through a PPI channel: the channel's event end
//! point (EEP) holds the address of the event register, its task end point
//! (TEP) the address of the task register.
//!
//! Channels 20 to 31 are pre-programmed by the hardware and cannot be
//! connected here.

use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{register_structs, ReadWrite};
use kernel::utilities::StaticRef;

/// Channels whose end points are configurable.
pub const NUM_CONFIGURABLE_CHANNELS: usize = 20;

pub const PPI_BASE: StaticRef<PpiRegisters> =
    unsafe { StaticRef::new(0x4001_F000 as *const PpiRegisters) };

register_structs! {
    pub PpiRegisters {
        (0x000 => _reserved0),
        (0x500 => chen: ReadWrite<u32>),
        (0x504 => chenset: ReadWrite<u32>),
        (0x508 => chenclr: ReadWrite<u32>),
        (0x50C => _reserved1),
        (0x510 => ch: [PpiChannel; NUM_CONFIGURABLE_CHANNELS]),
        (0x5B0 => @END),
    },

    PpiChannel {
        (0x0 => eep: ReadWrite<u32>),
        (0x4 => tep: ReadWrite<u32>),
        (0x8 => @END),
    }
}

// Safety: memory mapped I/O on a single core; every access is one volatile
// word access and channel enables go through the atomic `CHENSET`/`CHENCLR`.
unsafe impl Sync for PpiRegisters {}

/// Register access to the PPI.
///
/// Channel enables go through the `CHENSET`/`CHENCLR` pair, which only a
/// real (or simulated) peripheral turns into `CHEN` updates.
pub trait PpiRegisterBlock: Sync {
    fn set_endpoints(&self, channel: usize, event: u32, task: u32);
    fn event_endpoint(&self, channel: usize) -> u32;
    fn task_endpoint(&self, channel: usize) -> u32;
    fn enable_channels(&self, mask: u32);
    fn disable_channels(&self, mask: u32);
    fn enabled_channels(&self) -> u32;
}

impl PpiRegisterBlock for PpiRegisters {
    fn set_endpoints(&self, channel: usize, event: u32, task: u32) {
        self.ch[channel].eep.set(event);
        self.ch[channel].tep.set(task);
    }

    fn event_endpoint(&self, channel: usize) -> u32 {
        self.ch[channel].eep.get()
    }

    fn task_endpoint(&self, channel: usize) -> u32 {
        self.ch[channel].tep.get()
    }

    fn enable_channels(&self, mask: u32) {
        self.chenset.set(mask);
    }

    fn disable_channels(&self, mask: u32) {
        self.chenclr.set(mask);
    }

    fn enabled_channels(&self) -> u32 {
        self.chen.get()
    }
}

pub struct Ppi<'a> {
    registers: &'a dyn PpiRegisterBlock,
}

impl<'a> Ppi<'a> {
    pub const fn new(registers: &'a dyn PpiRegisterBlock) -> Self {
        Ppi { registers }
    }

    /// Trigger the task at address `task` whenever the event at address
    /// `event` fires. The channel still has to be enabled.
    pub fn connect(&self, channel: usize, event: u32, task: u32) {
        self.registers.set_endpoints(channel, event, task);
    }

    pub fn enable(&self, channel: usize) {
        self.registers.enable_channels(1 << channel);
    }

    pub fn disable(&self, channel: usize) {
        self.registers.disable_channels(1 << channel);
    }

    pub fn is_enabled(&self, channel: usize) -> bool {
        self.registers.enabled_channels() & (1 << channel) != 0
    }

    /// Task address the channel triggers, if the channel is enabled.
    pub fn active_task(&self, channel: usize) -> Option<u32> {
        if self.is_enabled(channel) {
            Some(self.registers.task_endpoint(channel))
        } else {
            None
        }
    }

    pub fn event(&self, channel: usize) -> u32 {
        self.registers.event_endpoint(channel)
    }
}
