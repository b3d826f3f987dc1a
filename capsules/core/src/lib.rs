// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Shared SPI bus arbitration and blocking transfers on top of a chip's
//! `SpiBusController`.

#![forbid(unsafe_code)]
#![no_std]

#[cfg(test)]
extern crate std;

pub mod spi_bus;
pub mod spi_device;

#[cfg(test)]
mod test;
