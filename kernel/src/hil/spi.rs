// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces for SPI controller (master) communication.
//!
//! A chip implements [`SpiBusController`] for one bus instance. The
//! controller only knows how to move one chunk of bytes at a time; bus
//! arbitration, chip select handling and splitting long transfers into
//! chunks are done on top of it (see `capsules_core::spi_bus`).

use crate::hil::gpio;
use crate::ErrorCode;

/// Data order defines the order of bits sent over the wire: most significant
/// first, or least significant first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DataOrder {
    /// Send the most significant bit first.
    MSBFirst,
    /// Send the least significant bit first.
    LSBFirst,
}

/// Clock polarity (CPOL) defines whether the SPI clock is high or low when
/// idle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockPolarity {
    /// The clock is low when the SPI bus is not active. This is CPOL = 0.
    IdleLow,
    /// The clock is high when the SPI bus is not active. This is CPOL = 1.
    IdleHigh,
}

/// Clock phase (CPHA) defines whether to sample and send data on a leading or
/// trailing clock edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClockPhase {
    /// Sample on the leading clock edge. This is CPHA = 0.
    SampleLeading,
    /// Sample on the trailing clock edge. This is CPHA = 1.
    SampleTrailing,
}

/// The four standard SPI modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// CPOL = 0, CPHA = 0
    Mode0,
    /// CPOL = 0, CPHA = 1
    Mode1,
    /// CPOL = 1, CPHA = 0
    Mode2,
    /// CPOL = 1, CPHA = 1
    Mode3,
}

impl Mode {
    pub fn polarity(self) -> ClockPolarity {
        match self {
            Mode::Mode0 | Mode::Mode1 => ClockPolarity::IdleLow,
            Mode::Mode2 | Mode::Mode3 => ClockPolarity::IdleHigh,
        }
    }

    pub fn phase(self) -> ClockPhase {
        match self {
            Mode::Mode0 | Mode::Mode2 => ClockPhase::SampleLeading,
            Mode::Mode1 | Mode::Mode3 => ClockPhase::SampleTrailing,
        }
    }
}

/// An optional chip select line. Chip selects are active low: `clear`
/// asserts, `set` deasserts. `None` means the caller drives chip select
/// itself.
pub type ChipSelect<'a> = Option<&'a dyn gpio::Pin>;

/// One hardware-sized portion of a transfer.
///
/// `tx` and `rx`, when present, are exactly `len` bytes long.
pub struct Chunk<'a> {
    pub tx: Option<&'a [u8]>,
    pub rx: Option<&'a mut [u8]>,
    pub len: usize,
    /// The whole transfer is a single byte. Controllers affected by the
    /// single-byte overrun erratum use this to arm their workaround.
    pub single_byte: bool,
}

/// How a controller waits for its chunk to finish.
///
/// Provided by the bus layer, which owns the waiting-thread record and the
/// timeout configuration.
pub trait ChunkCompletion {
    /// Record the calling thread as waiting for the completion interrupt.
    /// Must be called before the hardware is started.
    fn prepare(&self);

    /// Block until the completion interrupt wakes the thread recorded by
    /// `prepare`. Returns `BUSY` if the configured deadline passes first.
    fn wait(&self) -> Result<(), ErrorCode>;

    /// Busy-wait until `done` returns `true`. Returns `BUSY` if the
    /// configured spin limit is exceeded.
    fn spin_until(&self, done: &mut dyn FnMut() -> bool) -> Result<(), ErrorCode>;
}

/// One SPI controller instance, driven a chunk at a time.
pub trait SpiBusController: Sync {
    /// Largest chunk `transfer_chunk` accepts.
    const MAX_CHUNK: usize;

    /// Configure clock, data-out and data-in pins and route them to the
    /// peripheral. Enables the completion interrupt line, if the controller
    /// has one.
    fn init(&self);

    /// Apply mode and clock rate and enable the peripheral. Returns the
    /// clock rate actually used.
    fn configure(&self, mode: Mode, rate_hz: u32) -> Result<u32, ErrorCode>;

    /// Disable (and power down, where supported) the peripheral.
    fn shutdown(&self);

    /// Whether the controller can read `buf` directly.
    fn is_dma_reachable(&self, _buf: &[u8]) -> bool {
        true
    }

    /// Clock out `chunk.tx` (or filler bytes) and store what is clocked in to
    /// `chunk.rx`. Returns once the chunk is complete.
    fn transfer_chunk(
        &self,
        chunk: Chunk<'_>,
        completion: &dyn ChunkCompletion,
    ) -> Result<(), ErrorCode>;

    /// Acknowledge the completion interrupt. Returns `false` if the
    /// controller had nothing pending.
    fn handle_interrupt(&self) -> bool;
}
