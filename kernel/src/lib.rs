// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Core kernel definitions for the SPI bus stack.
//!
//! The kernel crate holds the shared code that chips, capsules, and boards
//! use: the Hardware Interface Layer (HIL) definitions, the thread and mutex
//! interfaces that blocking drivers are written against, the `ErrorCode` type,
//! and the `debug!` output machinery.
//!
//! Most `unsafe` code is in this kernel crate.

#![warn(unreachable_pub)]
#![no_std]

#[cfg(test)]
extern crate std;

#[macro_use]
pub mod debug;
pub mod errorcode;
pub mod hil;
pub mod platform;
pub mod threads;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
