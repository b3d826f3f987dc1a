// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! An abstraction over the pin multiplexer, nRF5X-family
//!
//! Controller drivers should use the `Pinmux` type (instead of a `u32`) for
//! fields that determine which pins are used by the hardware. The board
//! configuration should create `Pinmux`s and pass them into controller drivers
//! during initialization.

/// Pins per GPIO port.
pub const PIN_PER_PORT: u32 = 32;

/// An opaque wrapper around a configurable pin.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pinmux(u32);

impl Pinmux {
    /// Creates a new `Pinmux` wrapping the numbered pin.
    pub const fn new(pin: u32) -> Pinmux {
        Pinmux(pin)
    }

    /// Index of the pin within its port.
    pub const fn index(self) -> usize {
        (self.0 % PIN_PER_PORT) as usize
    }
}

impl From<Pinmux> for u32 {
    fn from(val: Pinmux) -> Self {
        val.0
    }
}
