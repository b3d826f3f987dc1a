// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Definitions shared by the nRF51 `SPI` and nRF52 `SPIM` masters.

use kernel::hil::spi::{ClockPhase, ClockPolarity, DataOrder, Mode};

/// An enum representing all allowable `FREQUENCY` register values.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Frequency {
    K125 = 0x02000000,
    K250 = 0x04000000,
    K500 = 0x08000000,
    M1 = 0x10000000,
    M2 = 0x20000000,
    M4 = 0x40000000,
    M8 = 0x80000000,
}

impl From<Frequency> for u32 {
    fn from(freq: Frequency) -> u32 {
        match freq {
            Frequency::K125 => 125_000,
            Frequency::K250 => 250_000,
            Frequency::K500 => 500_000,
            Frequency::M1 => 1_000_000,
            Frequency::M2 => 2_000_000,
            Frequency::M4 => 4_000_000,
            Frequency::M8 => 8_000_000,
        }
    }
}

/// The fastest frequency not above `freq`, or the slowest one.
impl From<u32> for Frequency {
    fn from(freq: u32) -> Frequency {
        if freq < 250_000 {
            Frequency::K125
        } else if freq < 500_000 {
            Frequency::K250
        } else if freq < 1_000_000 {
            Frequency::K500
        } else if freq < 2_000_000 {
            Frequency::M1
        } else if freq < 4_000_000 {
            Frequency::M2
        } else if freq < 8_000_000 {
            Frequency::M4
        } else {
            Frequency::M8
        }
    }
}

impl Frequency {
    /// Raw `FREQUENCY` register value.
    pub fn register_value(self) -> u32 {
        self as u32
    }
}

/// Raw `CONFIG` register value: bit 0 ORDER, bit 1 CPHA, bit 2 CPOL.
pub fn config_value(mode: Mode, order: DataOrder) -> u32 {
    let order = match order {
        DataOrder::MSBFirst => 0,
        DataOrder::LSBFirst => 1,
    };
    let cpha = match mode.phase() {
        ClockPhase::SampleLeading => 0,
        ClockPhase::SampleTrailing => 1,
    };
    let cpol = match mode.polarity() {
        ClockPolarity::IdleLow => 0,
        ClockPolarity::IdleHigh => 1,
    };
    order | cpha << 1 | cpol << 2
}
