// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral implementations shared by the nRF51 and nRF52 families.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod gpio;
pub mod pinmux;
pub mod spi;
