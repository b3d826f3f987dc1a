// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! SPI master for the nRF51.
//!
//! The nRF51 `SPI` peripheral has no EasyDMA. Each byte is written to `TXD`,
//! and the byte clocked in is read from `RXD` once `EVENTS_READY` is set.
//! Transfers are therefore polled and never need to be split into chunks.

use kernel::hil::gpio::Configure;
use kernel::hil::spi::{Chunk, ChunkCompletion, DataOrder, Mode, SpiBusController};
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, ReadOnly, ReadWrite};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;
use nrf5x::gpio::Port;
use nrf5x::pinmux::Pinmux;
use nrf5x::spi::{config_value, Frequency};

pub const SPI0_BASE: StaticRef<SpiRegisters> =
    unsafe { StaticRef::new(0x4000_3000 as *const SpiRegisters) };
pub const SPI1_BASE: StaticRef<SpiRegisters> =
    unsafe { StaticRef::new(0x4000_4000 as *const SpiRegisters) };

#[repr(C)]
pub struct SpiRegisters {
    _reserved0: [u32; 66],
    events_ready: ReadWrite<u32, Event::Register>, //.. 0x108
    _reserved1: [u32; 253],
    enable: ReadWrite<u32, Enable::Register>, //....... 0x500
    _reserved2: [u32; 1],
    psel_sck: ReadWrite<u32>,  //...................... 0x508
    psel_mosi: ReadWrite<u32>, //...................... 0x50c
    psel_miso: ReadWrite<u32>, //...................... 0x510
    _reserved3: [u32; 1],
    rxd: ReadOnly<u32, Data::Register>,  //............ 0x518
    txd: ReadWrite<u32, Data::Register>, //............ 0x51c
    _reserved4: [u32; 1],
    frequency: ReadWrite<u32>, //...................... 0x524
    _reserved5: [u32; 11],
    config: ReadWrite<u32>, //......................... 0x554
    _reserved6: [u32; 681],
    power: ReadWrite<u32, Power::Register>, //......... 0xffc
}

// Safety: memory mapped I/O on a single core. Every access is one volatile
// word access, made by the thread holding the bus lock.
unsafe impl Sync for SpiRegisters {}

register_bitfields![u32,
    Event [
        READY 0
    ],
    Enable [
        ENABLE OFFSET(0) NUMBITS(3) [
            Disable = 0,
            Enable = 1
        ]
    ],
    Data [
        DATA OFFSET(0) NUMBITS(8) []
    ],
    Power [
        POWER 0
    ]
];

/// Register-level access to one nRF51 `SPI` instance.
pub trait SpiRegisterBlock: Sync {
    fn power_on(&self);
    fn power_off(&self);
    fn enable(&self);
    fn disable(&self);
    fn select_pins(&self, sck: Pinmux, mosi: Pinmux, miso: Pinmux);
    fn configure(&self, mode: Mode, order: DataOrder);
    fn set_frequency(&self, freq: Frequency);
    fn ready_event(&self) -> bool;
    fn clear_ready_event(&self);
    fn write_txd(&self, byte: u8);
    fn read_rxd(&self) -> u8;
}

impl SpiRegisterBlock for SpiRegisters {
    fn power_on(&self) {
        self.power.write(Power::POWER::SET);
    }

    fn power_off(&self) {
        self.power.write(Power::POWER::CLEAR);
    }

    fn enable(&self) {
        self.enable.write(Enable::ENABLE::Enable);
    }

    fn disable(&self) {
        self.enable.write(Enable::ENABLE::Disable);
    }

    fn select_pins(&self, sck: Pinmux, mosi: Pinmux, miso: Pinmux) {
        self.psel_sck.set(sck.into());
        self.psel_mosi.set(mosi.into());
        self.psel_miso.set(miso.into());
    }

    fn configure(&self, mode: Mode, order: DataOrder) {
        self.config.set(config_value(mode, order));
    }

    fn set_frequency(&self, freq: Frequency) {
        self.frequency.set(freq.register_value());
    }

    fn ready_event(&self) -> bool {
        self.events_ready.is_set(Event::READY)
    }

    fn clear_ready_event(&self) {
        self.events_ready.write(Event::READY::CLEAR);
    }

    fn write_txd(&self, byte: u8) {
        self.txd.write(Data::DATA.val(byte.into()));
    }

    fn read_rxd(&self) -> u8 {
        self.rxd.read(Data::DATA) as u8
    }
}

/// Pins of one `SPI` instance.
#[derive(Copy, Clone, Debug)]
pub struct SpiPins {
    pub sck: Pinmux,
    pub mosi: Pinmux,
    pub miso: Pinmux,
}

pub struct Spi<'a, R: SpiRegisterBlock> {
    registers: &'a R,
    pins: SpiPins,
    gpio: &'a Port,
}

impl<'a, R: SpiRegisterBlock> Spi<'a, R> {
    pub fn new(registers: &'a R, pins: SpiPins, gpio: &'a Port) -> Self {
        Spi {
            registers,
            pins,
            gpio,
        }
    }
}

impl<R: SpiRegisterBlock> SpiBusController for Spi<'_, R> {
    const MAX_CHUNK: usize = usize::MAX;

    fn init(&self) {
        self.gpio[self.pins.sck].make_output();
        self.gpio[self.pins.mosi].make_output();
        self.gpio[self.pins.miso].make_input();
        self.registers
            .select_pins(self.pins.sck, self.pins.mosi, self.pins.miso);
    }

    fn configure(&self, mode: Mode, rate_hz: u32) -> Result<u32, ErrorCode> {
        if rate_hz == 0 {
            return Err(ErrorCode::INVAL);
        }
        let freq = Frequency::from(rate_hz);
        self.registers.power_on();
        self.registers.configure(mode, DataOrder::MSBFirst);
        self.registers.set_frequency(freq);
        self.registers.enable();
        Ok(freq.into())
    }

    fn shutdown(&self) {
        self.registers.disable();
        self.registers.power_off();
    }

    fn transfer_chunk(
        &self,
        chunk: Chunk<'_>,
        completion: &dyn ChunkCompletion,
    ) -> Result<(), ErrorCode> {
        let tx = chunk.tx;
        let mut rx = chunk.rx;
        for i in 0..chunk.len {
            let out = tx.map_or(0, |b| b[i]);
            self.registers.clear_ready_event();
            self.registers.write_txd(out);
            completion.spin_until(&mut || self.registers.ready_event())?;
            let received = self.registers.read_rxd();
            if let Some(rx) = rx.as_deref_mut() {
                rx[i] = received;
            }
        }
        Ok(())
    }

    /// The `READY` event is polled; no interrupt is ever enabled.
    fn handle_interrupt(&self) -> bool {
        false
    }
}
