// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Host board running the nRF5x SPI drivers against simulated peripherals.

pub mod board;
pub mod io;
pub mod sim;
pub mod threads;
