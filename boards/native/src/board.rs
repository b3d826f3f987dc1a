// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Board setup: simulated nRF52 and nRF51 peripherals wired to the real chip
//! drivers and the shared SPI bus registry.
//!
//! Objects live for the whole program, so they are leaked with `Box::leak`,
//! the host counterpart of `static_init!`.

use std::ops::Range;

use capsules_core::spi_bus::{BusConfig, BusRegistry};
use kernel::platform::InterruptService;
use nrf51::spi::{Spi, SpiPins};
use nrf52::peripheral_interrupts;
use nrf52::ppi::Ppi;
use nrf52::spi::{Spim, SpimPins};
use nrf52::spim_stop::SingleByteStop;
use nrf5x::gpio::{GpioRegisters, GpioteRegisters, Gpiote, Port};
use nrf5x::pinmux::Pinmux;

use crate::sim::nvic::SimNvic;
use crate::sim::ppi::SimPpi;
use crate::sim::ram;
use crate::sim::spi::SimSpi;
use crate::sim::spim::SimSpim;
use crate::threads::{NativeMutex, NativeThreadFlags};

pub const NUM_SPIM: usize = 3;
pub const NUM_SPI: usize = 2;

/// SCK, MOSI and MISO of each nRF52 SPIM instance.
pub const SPIM_PINS: [SpimPins; NUM_SPIM] = [
    SpimPins {
        sck: Pinmux::new(25),
        mosi: Pinmux::new(23),
        miso: Pinmux::new(24),
    },
    SpimPins {
        sck: Pinmux::new(4),
        mosi: Pinmux::new(5),
        miso: Pinmux::new(6),
    },
    SpimPins {
        sck: Pinmux::new(13),
        mosi: Pinmux::new(14),
        miso: Pinmux::new(15),
    },
];

/// SCK, MOSI and MISO of each nRF51 SPI instance.
pub const SPI_PINS: [SpiPins; NUM_SPI] = [
    SpiPins {
        sck: Pinmux::new(29),
        mosi: Pinmux::new(25),
        miso: Pinmux::new(28),
    },
    SpiPins {
        sck: Pinmux::new(1),
        mosi: Pinmux::new(2),
        miso: Pinmux::new(3),
    },
];

/// Bus addresses of SPIM0..2.
/// Host buffers live anywhere in the address space; simulated flash is
/// rejected by `SimSpim` instead.
const HOST_DATA_RAM: Range<usize> = 0..usize::MAX;

const SPIM_BASES: [u32; NUM_SPIM] = [0x4000_3000, 0x4000_4000, 0x4002_3000];

const SPIM_INTERRUPTS: [u32; NUM_SPIM] = [
    peripheral_interrupts::SPIM0_TWIM0,
    peripheral_interrupts::SPIM1_TWIM1,
    peripheral_interrupts::SPIM2,
];

pub type Nrf52Spim = Spim<'static, SimSpim>;
pub type Nrf52Registry = BusRegistry<'static, Nrf52Spim, NativeMutex, NativeThreadFlags, NUM_SPIM>;
pub type Nrf51Spi = Spi<'static, SimSpi>;
pub type Nrf51Registry = BusRegistry<'static, Nrf51Spi, NativeMutex, NativeThreadFlags, NUM_SPI>;

fn leak<T: 'static>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

/// An nRF52 board with its three SPIM buses.
pub struct Nrf52Board {
    pub port: &'static Port,
    pub gpiote: &'static Gpiote,
    pub ppi: &'static Ppi<'static>,
    pub nvic: &'static SimNvic,
    pub flags: &'static NativeThreadFlags,
    pub spims: [&'static SimSpim; NUM_SPIM],
    pub spi: &'static Nrf52Registry,
}

impl Nrf52Board {
    pub fn new(config: BusConfig) -> &'static Nrf52Board {
        let port = leak(Port::new(ram::<GpioRegisters>()));
        let gpiote = leak(Gpiote::new(ram::<GpioteRegisters>()));
        let ppi = leak(Ppi::new(leak(SimPpi::new())));
        let nvic = leak(SimNvic::new());
        let flags = leak(NativeThreadFlags::default());

        let spims: [&'static SimSpim; NUM_SPIM] = std::array::from_fn(|i| {
            leak(SimSpim::new(
                SPIM_BASES[i],
                SPIM_INTERRUPTS[i],
                nvic,
                gpiote,
                ppi,
            ))
        });
        // The workaround channel of each bus is its bus index.
        let controllers: [&'static Nrf52Spim; NUM_SPIM] = std::array::from_fn(|i| {
            leak(Spim::new(
                spims[i],
                SPIM_PINS[i],
                port,
                SingleByteStop::new(gpiote, ppi, i),
                leak(nvic.line(SPIM_INTERRUPTS[i])),
                HOST_DATA_RAM,
            ))
        });
        let spi = leak(BusRegistry::new(controllers, flags, config));

        let board = leak(Nrf52Board {
            port,
            gpiote,
            ppi,
            nvic,
            flags,
            spims,
            spi,
        });
        nvic.set_service(board);
        board
    }
}

impl InterruptService for Nrf52Board {
    fn service_interrupt(&self, interrupt: u32) -> bool {
        match interrupt {
            peripheral_interrupts::SPIM0_TWIM0 => self.spi.handle_interrupt(0),
            peripheral_interrupts::SPIM1_TWIM1 => self.spi.handle_interrupt(1),
            peripheral_interrupts::SPIM2 => self.spi.handle_interrupt(2),
            _ => false,
        }
    }
}

/// An nRF51 board with its two polled SPI buses.
pub struct Nrf51Board {
    pub port: &'static Port,
    pub spis: [&'static SimSpi; NUM_SPI],
    pub spi: &'static Nrf51Registry,
}

impl Nrf51Board {
    pub fn new(config: BusConfig) -> &'static Nrf51Board {
        let port = leak(Port::new(ram::<GpioRegisters>()));
        let flags = leak(NativeThreadFlags::default());
        let spis: [&'static SimSpi; NUM_SPI] = std::array::from_fn(|_| leak(SimSpi::default()));
        let controllers: [&'static Nrf51Spi; NUM_SPI] =
            std::array::from_fn(|i| leak(Spi::new(spis[i], SPI_PINS[i], port)));
        let spi = leak(BusRegistry::new(controllers, flags, config));
        leak(Nrf51Board { port, spis, spi })
    }
}
