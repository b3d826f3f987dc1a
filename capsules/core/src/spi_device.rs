// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! `embedded-hal` view of one peripheral on a shared bus.
//!
//! Each [`SpiBusDevice`] names a bus, a chip select pin, and the mode and
//! clock rate the peripheral wants. A transaction acquires the bus, runs all
//! operations with chip select held low, then releases both.

use embedded_hal::spi::{self, ErrorKind, ErrorType, Operation};
use kernel::hil::gpio;
use kernel::hil::spi::{Mode, SpiBusController};
use kernel::threads::{RawMutex, ThreadFlags};
use kernel::ErrorCode;

use crate::spi_bus::{AcquiredBus, SpiBus, SCRATCH_LEN};

/// A bus error surfaced through `embedded-hal`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpiDeviceError(pub ErrorCode);

impl spi::Error for SpiDeviceError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl From<ErrorCode> for SpiDeviceError {
    fn from(e: ErrorCode) -> Self {
        SpiDeviceError(e)
    }
}

pub struct SpiBusDevice<'b, 'a, C: SpiBusController, M: RawMutex, F: ThreadFlags> {
    bus: &'b SpiBus<'a, C, M, F>,
    cs: &'b dyn gpio::Pin,
    mode: Mode,
    rate_hz: u32,
}

impl<'b, 'a, C: SpiBusController, M: RawMutex, F: ThreadFlags> SpiBusDevice<'b, 'a, C, M, F> {
    /// Configure `cs` and bind it to `bus`. The bus must be initialized.
    pub fn new(
        bus: &'b SpiBus<'a, C, M, F>,
        cs: &'b dyn gpio::Pin,
        mode: Mode,
        rate_hz: u32,
    ) -> Result<Self, ErrorCode> {
        bus.init_cs(cs)?;
        Ok(SpiBusDevice {
            bus,
            cs,
            mode,
            rate_hz,
        })
    }

    fn run(
        &self,
        spi: &mut AcquiredBus<'_, 'a, C, M, F>,
        op: &mut Operation<'_, u8>,
    ) -> Result<(), ErrorCode> {
        let cs = Some(self.cs);
        match op {
            Operation::Read(buf) => {
                let len = buf.len();
                spi.transfer_bytes(cs, true, None, Some(&mut buf[..]), len)
            }
            Operation::Write(buf) => spi.transfer_bytes(cs, true, Some(&buf[..]), None, buf.len()),
            Operation::Transfer(read, write) => {
                let common = read.len().min(write.len());
                let (read_head, read_tail) = read.split_at_mut(common);
                let (write_head, write_tail) = write.split_at(common);
                if common > 0 {
                    spi.transfer_bytes(cs, true, Some(write_head), Some(read_head), common)?;
                }
                if !write_tail.is_empty() {
                    spi.transfer_bytes(cs, true, Some(write_tail), None, write_tail.len())?;
                }
                if !read_tail.is_empty() {
                    let len = read_tail.len();
                    spi.transfer_bytes(cs, true, None, Some(read_tail), len)?;
                }
                Ok(())
            }
            Operation::TransferInPlace(buf) => {
                let mut out = [0u8; SCRATCH_LEN];
                for piece in buf.chunks_mut(SCRATCH_LEN) {
                    let len = piece.len();
                    out[..len].copy_from_slice(piece);
                    spi.transfer_bytes(cs, true, Some(&out[..len]), Some(piece), len)?;
                }
                Ok(())
            }
            Operation::DelayNs(_) => Err(ErrorCode::NOSUPPORT),
        }
    }
}

impl<C: SpiBusController, M: RawMutex, F: ThreadFlags> ErrorType for SpiBusDevice<'_, '_, C, M, F> {
    type Error = SpiDeviceError;
}

impl<C: SpiBusController, M: RawMutex, F: ThreadFlags> spi::SpiDevice for SpiBusDevice<'_, '_, C, M, F> {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut spi = self.bus.acquire(Some(self.cs), self.mode, self.rate_hz)?;
        let result = operations
            .iter_mut()
            .try_for_each(|op| self.run(&mut spi, op));
        self.cs.set();
        spi.release();
        result.map_err(SpiDeviceError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi_bus::{BusConfig, BusRegistry};
    use crate::test::{Call, FakeController, FakePin, StdFlags, StdMutex};
    use embedded_hal::spi::SpiDevice;
    use std::boxed::Box;
    use std::vec;
    use std::vec::Vec;

    type Registry = BusRegistry<'static, FakeController, StdMutex, StdFlags, 1>;

    fn bus() -> &'static SpiBus<'static, FakeController, StdMutex, StdFlags> {
        let flags: &'static StdFlags = Box::leak(Box::default());
        let controller: &'static FakeController = Box::leak(Box::default());
        let registry: &'static Registry = Box::leak(Box::new(BusRegistry::new(
            [controller],
            flags,
            BusConfig::default(),
        )));
        controller.on_interrupt(move || {
            registry.handle_interrupt(0);
        });
        let bus = registry.bus(0).unwrap();
        bus.init();
        bus
    }

    fn sent(controller: &FakeController) -> Vec<Option<Vec<u8>>> {
        controller
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Chunk { tx, .. } => Some(tx),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn transaction_holds_chip_select() {
        let bus = bus();
        let pin = FakePin::default();
        let mut dev = SpiBusDevice::new(bus, &pin, Mode::Mode0, 2_000_000).unwrap();

        let mut reply = [0u8; 2];
        dev.transaction(&mut [
            Operation::Write(&[0xD0][..]),
            Operation::Read(&mut reply[..]),
        ])
        .unwrap();

        assert_eq!(reply, [0xFF, 0xFF]);
        assert_eq!(pin.edges(), [true, false, true]);
        assert_eq!(sent(controller(bus)), [Some(vec![0xD0]), None]);
    }

    #[test]
    fn uneven_transfer_is_split() {
        let bus = bus();
        let pin = FakePin::default();
        let mut dev = SpiBusDevice::new(bus, &pin, Mode::Mode0, 1_000_000).unwrap();

        let mut read = [0u8; 4];
        dev.transfer(&mut read[..], &[1, 2][..]).unwrap();
        assert_eq!(read, [0xFE, 0xFD, 0xFF, 0xFF]);

        let mut buf = [0x10u8, 0x20, 0x30];
        dev.transfer_in_place(&mut buf[..]).unwrap();
        assert_eq!(buf, [0xEF, 0xDF, 0xCF]);
    }

    #[test]
    fn delay_is_unsupported_and_releases_chip_select() {
        let bus = bus();
        let pin = FakePin::default();
        let mut dev = SpiBusDevice::new(bus, &pin, Mode::Mode0, 1_000_000).unwrap();
        assert_eq!(
            dev.transaction(&mut [Operation::Write(&[1][..]), Operation::DelayNs(10)]),
            Err(SpiDeviceError(ErrorCode::NOSUPPORT))
        );
        assert!(pin.is_high());
        assert_eq!(controller(bus).calls().last(), Some(&Call::Shutdown));
    }

    fn controller<'b>(
        bus: &'b SpiBus<'static, FakeController, StdMutex, StdFlags>,
    ) -> &'b FakeController {
        bus.controller()
    }
}
