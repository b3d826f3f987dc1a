// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral implementations for the nRF52 family.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod peripheral_interrupts;
pub mod ppi;
pub mod spi;
pub mod spim_stop;
