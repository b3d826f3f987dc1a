// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Simulated nRF5x peripherals.
//!
//! Plain register files (GPIO, GPIOTE) are backed by zeroed host memory and
//! driven by the real chip drivers. Peripherals whose registers have side
//! effects (SPIM, SPI, PPI, the interrupt controller) get a behavioral model
//! implementing the chip crate's register-block trait.

pub mod nvic;
pub mod pin;
pub mod ppi;
pub mod slave;
pub mod spi;
pub mod spim;

use kernel::utilities::StaticRef;

/// A leaked, zero-initialized register file.
///
/// Only for register structs made of plain integer registers.
pub fn ram<T: 'static>() -> StaticRef<T> {
    // Safety: the register structs hold only `u32` cells, for which all-zero
    // is a valid value, and the allocation is never freed.
    let regs: &'static T = Box::leak(Box::new(unsafe { std::mem::zeroed::<T>() }));
    unsafe { StaticRef::new(regs) }
}
