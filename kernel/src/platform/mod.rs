// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for chips and boards.

/// One interrupt line at the interrupt controller.
pub trait InterruptLine: Sync {
    fn enable(&self);
    fn disable(&self);
    fn is_enabled(&self) -> bool;
}

/// Interface for handling interrupts on a hardware chip.
///
/// Each board implements this to dispatch interrupt numbers to the driver
/// that owns them.
pub trait InterruptService {
    /// Service an interrupt, if supported by this chip. If this interrupt
    /// number is not supported, return false.
    fn service_interrupt(&self, interrupt: u32) -> bool;
}
