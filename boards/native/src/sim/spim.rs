// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Behavioral model of an nRF52 `SPIM` with EasyDMA.
//!
//! `TASKS_START` runs the whole transfer immediately on the calling thread:
//! bytes are read from the TXD buffer, clocked over the wire, written to the
//! RXD buffer, and then `EVENTS_END` is set and, if enabled, the `END`
//! interrupt raised. Enabling the interrupt while `EVENTS_END` is already
//! set raises it at once, as the level-triggered line does on hardware.
//!
//! The model reproduces anomaly 58: with `RXD.MAXCNT == 1` and
//! `TXD.MAXCNT <= 1` a second byte is clocked unless a PPI channel routes a
//! GPIOTE event on SCK to this instance's `TASKS_STOP`. It also refuses to
//! read TXD data from regions registered as flash, like EasyDMA.

use std::ops::Range;
use std::sync::{Mutex, MutexGuard, PoisonError};

use kernel::debug;
use kernel::hil::spi::{DataOrder, Mode};
use nrf52::ppi::{Ppi, NUM_CONFIGURABLE_CHANNELS};
use nrf52::spi::SpimRegisterBlock;
use nrf5x::gpio::{Gpiote, NUM_GPIOTE};
use nrf5x::pinmux::Pinmux;
use nrf5x::spi::Frequency;

use super::nvic::SimNvic;
use super::slave::SimWire;

/// One `TASKS_START` as seen by the peripheral.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpimTransfer {
    pub tx_maxcnt: u8,
    pub rx_maxcnt: u8,
    /// The SCK-to-STOP link was enabled when the transfer started.
    pub stop_armed: bool,
    pub end_interrupt: bool,
    /// Anomaly 58 clocked an extra byte.
    pub overrun: bool,
    /// TXD pointed at memory EasyDMA cannot read.
    pub dma_fault: bool,
    /// Bytes that went out on MOSI.
    pub mosi: Vec<u8>,
}

#[derive(Default)]
struct SpimState {
    enabled: bool,
    pins: Option<(Pinmux, Pinmux, Pinmux)>,
    mode: Option<(Mode, DataOrder)>,
    frequency: Option<Frequency>,
    orc: u8,
    tx: (usize, u8),
    rx: (usize, u8),
    lists_cleared: bool,
    end: bool,
    end_interrupt: bool,
    hang: bool,
    stops: usize,
}

pub struct SimSpim {
    base: u32,
    interrupt: u32,
    wire: SimWire,
    nvic: &'static SimNvic,
    gpiote: &'static Gpiote,
    ppi: &'static Ppi<'static>,
    state: Mutex<SpimState>,
    flash: Mutex<Vec<Range<usize>>>,
    log: Mutex<Vec<SpimTransfer>>,
}

impl SimSpim {
    /// An instance at bus address `base` raising `interrupt`.
    pub fn new(
        base: u32,
        interrupt: u32,
        nvic: &'static SimNvic,
        gpiote: &'static Gpiote,
        ppi: &'static Ppi<'static>,
    ) -> SimSpim {
        SimSpim {
            base,
            interrupt,
            wire: SimWire::default(),
            nvic,
            gpiote,
            ppi,
            state: Mutex::new(SpimState::default()),
            flash: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn wire(&self) -> &SimWire {
        &self.wire
    }

    pub fn interrupt(&self) -> u32 {
        self.interrupt
    }

    /// Treat `region` as flash: EasyDMA cannot read it.
    pub fn place_in_flash(&self, region: &'static [u8]) {
        self.flash
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(region.as_ptr_range().start as usize..region.as_ptr_range().end as usize);
    }

    /// While set, started transfers never reach `END`.
    pub fn set_hang(&self, hang: bool) {
        self.state().hang = hang;
    }

    /// Set `EVENTS_END` for a transfer that finished after its waiter gave
    /// up, raising the interrupt if it is enabled.
    pub fn finish_late(&self) {
        let mut st = self.state();
        st.end = true;
        let raise = st.end_interrupt;
        drop(st);
        if raise {
            self.nvic.raise(self.interrupt);
        }
    }

    /// Assert the interrupt line without a completed transfer.
    pub fn raise_interrupt(&self) -> bool {
        self.nvic.raise(self.interrupt)
    }

    pub fn transfers(&self) -> Vec<SpimTransfer> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_log(&self) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    pub fn pins(&self) -> Option<(Pinmux, Pinmux, Pinmux)> {
        self.state().pins
    }

    pub fn mode(&self) -> Option<(Mode, DataOrder)> {
        self.state().mode
    }

    pub fn frequency(&self) -> Option<Frequency> {
        self.state().frequency
    }

    pub fn lists_cleared(&self) -> bool {
        self.state().lists_cleared
    }

    pub fn is_end_interrupt_enabled(&self) -> bool {
        self.state().end_interrupt
    }

    /// Number of `TASKS_STOP` writes.
    pub fn stops(&self) -> usize {
        self.state().stops
    }

    fn state(&self) -> MutexGuard<'_, SpimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Some enabled PPI channel fires this instance's `TASKS_STOP` from a
    /// GPIOTE event bound to `sck`.
    fn stop_linked(&self, sck: Pinmux) -> bool {
        let stop = self.stop_task_address();
        (0..NUM_CONFIGURABLE_CHANNELS).any(|ch| {
            self.ppi.active_task(ch) == Some(stop)
                && (0..NUM_GPIOTE).any(|g| {
                    self.gpiote.event_in_address(g) == self.ppi.event(ch)
                        && self.gpiote.event_pin(g) == Some(u32::from(sck))
                })
        })
    }
}

impl SpimRegisterBlock for SimSpim {
    fn select_pins(&self, sck: Pinmux, mosi: Pinmux, miso: Pinmux) {
        self.state().pins = Some((sck, mosi, miso));
    }

    fn configure(&self, mode: Mode, order: DataOrder) {
        self.state().mode = Some((mode, order));
    }

    fn set_frequency(&self, freq: Frequency) {
        self.state().frequency = Some(freq);
    }

    fn set_overread_character(&self, orc: u8) {
        self.state().orc = orc;
    }

    fn enable(&self) {
        self.state().enabled = true;
    }

    fn disable(&self) {
        self.state().enabled = false;
    }

    fn set_tx_buffer(&self, buf: *const u8, maxcnt: u8) {
        self.state().tx = (buf as usize, maxcnt);
    }

    fn set_rx_buffer(&self, buf: *mut u8, maxcnt: u8) {
        self.state().rx = (buf as usize, maxcnt);
    }

    fn clear_lists(&self) {
        self.state().lists_cleared = true;
    }

    fn end_event(&self) -> bool {
        self.state().end
    }

    fn clear_end_event(&self) {
        self.state().end = false;
    }

    fn enable_end_interrupt(&self) {
        let mut st = self.state();
        st.end_interrupt = true;
        let pending = st.end;
        drop(st);
        if pending {
            self.nvic.raise(self.interrupt);
        }
    }

    fn disable_end_interrupt(&self) {
        self.state().end_interrupt = false;
    }

    fn start(&self) {
        let mut st = self.state();
        if !st.enabled {
            debug!("spim@{:#x}: START while disabled", self.base);
            return;
        }
        let (tx, tx_len) = st.tx;
        let (rx, rx_len) = st.rx;
        let stop_armed = st.pins.is_some_and(|(sck, _, _)| self.stop_linked(sck));
        let overrun = rx_len == 1 && tx_len <= 1 && !stop_armed;
        let dma_fault = tx_len > 0 && !self.is_dma_reachable(tx, tx_len.into());

        let mut clocked = usize::from(tx_len.max(rx_len));
        if overrun {
            clocked += 1;
        }
        if stop_armed {
            clocked = clocked.min(1);
        }

        let mut record = SpimTransfer {
            tx_maxcnt: tx_len,
            rx_maxcnt: rx_len,
            stop_armed,
            end_interrupt: st.end_interrupt,
            overrun,
            dma_fault,
            mosi: Vec::with_capacity(clocked),
        };

        if st.hang {
            drop(st);
            self.log
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(record);
            return;
        }

        for i in 0..clocked {
            let mosi = if i >= usize::from(tx_len) {
                st.orc
            } else if dma_fault {
                0
            } else {
                // Safety: the driver keeps TXD.PTR valid for TXD.MAXCNT bytes
                // until END.
                unsafe { *(tx as *const u8).add(i) }
            };
            let miso = self.wire.clock(mosi);
            if i < usize::from(rx_len) {
                // Safety: as above, for RXD.PTR and RXD.MAXCNT.
                unsafe { *(rx as *mut u8).add(i) = miso };
            }
            record.mosi.push(mosi);
        }
        st.end = true;
        let raise = st.end_interrupt;
        drop(st);

        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        if raise {
            self.nvic.raise(self.interrupt);
        }
    }

    fn stop(&self) {
        self.state().stops += 1;
    }

    fn stop_task_address(&self) -> u32 {
        self.base + 0x014
    }

    fn is_dma_reachable(&self, addr: usize, len: usize) -> bool {
        let end = addr.saturating_add(len);
        !self
            .flash
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|region| addr < region.end && end > region.start)
    }
}
