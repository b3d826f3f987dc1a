// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interrupt numbers of the nRF52 serial peripherals.

pub const SPIM0_TWIM0: u32 = 3;
pub const SPIM1_TWIM1: u32 = 4;
pub const SPIM2: u32 = 35;
