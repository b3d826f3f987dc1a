// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interface for configuring and driving GPIO pins.

/// Enum for selecting which edge to trigger interrupts or events on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptEdge {
    RisingEdge,
    FallingEdge,
    EitherEdge,
}

/// Enum for which state the pin is in. `Function` means the pin has been
/// handed to a peripheral; determining which one is outside the scope of the
/// HIL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Configuration {
    LowPower,
    Input,
    Output,
    InputOutput,
    Function,
    Unknown,
}

/// The Pin trait allows a pin to be used as either input or output and to be
/// configured.
pub trait Pin: Input + Output + Configure {}

pub trait Configure {
    fn configuration(&self) -> Configuration;
    fn make_output(&self) -> Configuration;
    fn make_input(&self) -> Configuration;

    fn is_input(&self) -> bool {
        matches!(
            self.configuration(),
            Configuration::Input | Configuration::InputOutput
        )
    }

    fn is_output(&self) -> bool {
        matches!(
            self.configuration(),
            Configuration::Output | Configuration::InputOutput
        )
    }
}

pub trait Output {
    /// Set the GPIO pin high. If the pin is not an output or input/output,
    /// this call is ignored.
    fn set(&self);

    /// Set the GPIO pin low. If the pin is not an output or input/output,
    /// this call is ignored.
    fn clear(&self);

    /// Toggle the GPIO pin and return its new value.
    fn toggle(&self) -> bool;
}

pub trait Input {
    /// Get the current state of an input GPIO pin. For an output pin, return
    /// the output; for an input pin, return the input; for disabled or
    /// function pins the value is undefined.
    fn read(&self) -> bool;
}
