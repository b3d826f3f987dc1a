// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Behavioral model of the nRF51 `SPI` master.
//!
//! A write to `TXD` clocks one byte and sets `EVENTS_READY` with the reply in
//! `RXD`, provided the block is powered and enabled.

use std::sync::{Mutex, MutexGuard, PoisonError};

use kernel::hil::spi::{DataOrder, Mode};
use nrf51::spi::SpiRegisterBlock;
use nrf5x::pinmux::Pinmux;
use nrf5x::spi::Frequency;

use super::slave::SimWire;

#[derive(Default)]
struct SpiState {
    powered: bool,
    enabled: bool,
    pins: Option<(Pinmux, Pinmux, Pinmux)>,
    mode: Option<(Mode, DataOrder)>,
    frequency: Option<Frequency>,
    ready: bool,
    rxd: u8,
    hang: bool,
}

#[derive(Default)]
pub struct SimSpi {
    wire: SimWire,
    state: Mutex<SpiState>,
}

impl SimSpi {
    pub fn wire(&self) -> &SimWire {
        &self.wire
    }

    pub fn is_powered(&self) -> bool {
        self.state().powered
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

    /// While set, `READY` is never raised.
    pub fn set_hang(&self, hang: bool) {
        self.state().hang = hang;
    }

    fn state(&self) -> MutexGuard<'_, SpiState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SpiRegisterBlock for SimSpi {
    fn power_on(&self) {
        self.state().powered = true;
    }

    fn power_off(&self) {
        self.state().powered = false;
    }

    fn enable(&self) {
        self.state().enabled = true;
    }

    fn disable(&self) {
        self.state().enabled = false;
    }

    fn select_pins(&self, sck: Pinmux, mosi: Pinmux, miso: Pinmux) {
        self.state().pins = Some((sck, mosi, miso));
    }

    fn configure(&self, mode: Mode, order: DataOrder) {
        self.state().mode = Some((mode, order));
    }

    fn set_frequency(&self, freq: Frequency) {
        self.state().frequency = Some(freq);
    }

    fn ready_event(&self) -> bool {
        self.state().ready
    }

    fn clear_ready_event(&self) {
        self.state().ready = false;
    }

    fn write_txd(&self, byte: u8) {
        let mut st = self.state();
        if !(st.powered && st.enabled) || st.hang {
            return;
        }
        st.rxd = self.wire.clock(byte);
        st.ready = true;
    }

    fn read_rxd(&self) -> u8 {
        self.state().rxd
    }
}
