// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Implementation of SPI for NRF52 using EasyDMA.
//!
//! This file only implements support for the three SPI master (`SPIM`)
//! peripherals, and not SPI slave (`SPIS`).
//!
//! EasyDMA length registers are 8 bits wide, so one chunk is at most 255
//! bytes. Multi-byte chunks complete through the `END` interrupt; the single
//! byte case busy-waits on `EVENTS_END` with the FTPAN-58 stop link armed
//! (see [`crate::spim_stop`]).

use core::ops::Range;
use core::ptr;

use kernel::hil::gpio::Configure;
use kernel::hil::spi::{Chunk, ChunkCompletion, DataOrder, Mode, SpiBusController};
use kernel::platform::InterruptLine;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadWrite, WriteOnly};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;
use nrf5x::gpio::Port;
use nrf5x::pinmux::Pinmux;
use nrf5x::spi::{config_value, Frequency};

use crate::spim_stop::SingleByteStop;

pub const SPIM0_BASE: StaticRef<SpimRegisters> =
    unsafe { StaticRef::new(0x4000_3000 as *const SpimRegisters) };
pub const SPIM1_BASE: StaticRef<SpimRegisters> =
    unsafe { StaticRef::new(0x4000_4000 as *const SpimRegisters) };
pub const SPIM2_BASE: StaticRef<SpimRegisters> =
    unsafe { StaticRef::new(0x4002_3000 as *const SpimRegisters) };

/// Data RAM of each nRF52 variant, the only memory EasyDMA can read.
pub const NRF52832_DATA_RAM: Range<usize> = 0x2000_0000..0x2001_0000;
pub const NRF52833_DATA_RAM: Range<usize> = 0x2000_0000..0x2002_0000;
pub const NRF52840_DATA_RAM: Range<usize> = 0x2000_0000..0x2004_0000;

register_structs! {
    pub SpimRegisters {
        (0x000 => _reserved0),
        (0x010 => tasks_start: WriteOnly<u32, TASK::Register>),
        (0x014 => tasks_stop: WriteOnly<u32, TASK::Register>),
        (0x018 => _reserved1),
        (0x118 => events_end: ReadWrite<u32, EVENT::Register>),
        (0x11C => _reserved2),
        (0x304 => intenset: ReadWrite<u32, INTE::Register>),
        (0x308 => intenclr: ReadWrite<u32, INTE::Register>),
        (0x30C => _reserved3),
        (0x500 => enable: ReadWrite<u32, ENABLE::Register>),
        (0x504 => _reserved4),
        (0x508 => psel_sck: ReadWrite<u32>),
        (0x50C => psel_mosi: ReadWrite<u32>),
        (0x510 => psel_miso: ReadWrite<u32>),
        (0x514 => _reserved5),
        (0x524 => frequency: ReadWrite<u32>),
        (0x528 => _reserved6),
        (0x534 => rxd_ptr: ReadWrite<u32>),
        (0x538 => rxd_maxcnt: ReadWrite<u32, MAXCNT::Register>),
        (0x53C => _reserved7),
        (0x540 => rxd_list: ReadWrite<u32>),
        (0x544 => txd_ptr: ReadWrite<u32>),
        (0x548 => txd_maxcnt: ReadWrite<u32, MAXCNT::Register>),
        (0x54C => _reserved8),
        (0x550 => txd_list: ReadWrite<u32>),
        (0x554 => config: ReadWrite<u32, CONFIG::Register>),
        (0x558 => _reserved9),
        (0x5C0 => orc: ReadWrite<u32>),
        (0x5C4 => @END),
    }
}

// Safety: the registers are memory mapped I/O on a single core. Every
// access is one volatile word access, and a bus is only driven by the thread
// holding its lock or by its own interrupt handler.
unsafe impl Sync for SpimRegisters {}

register_bitfields![u32,
    TASK [
        TASK 0
    ],
    EVENT [
        EVENT 0
    ],
    INTE [
        /// End of RXD buffer and TXD buffer reached
        END 6
    ],
    ENABLE [
        ENABLE OFFSET(0) NUMBITS(4) [
            Disable = 0,
            Enable = 7
        ]
    ],
    MAXCNT [
        MAXCNT OFFSET(0) NUMBITS(8) []
    ],
    CONFIG [
        ORDER 0,
        CPHA 1,
        CPOL 2
    ]
];

/// Register-level access to one `SPIM` instance.
///
/// Implemented by the memory mapped registers, and by simulated peripherals
/// on the host.
pub trait SpimRegisterBlock: Sync {
    fn select_pins(&self, sck: Pinmux, mosi: Pinmux, miso: Pinmux);
    fn configure(&self, mode: Mode, order: DataOrder);
    fn set_frequency(&self, freq: Frequency);
    /// Character clocked out once the TX buffer is exhausted.
    fn set_overread_character(&self, orc: u8);
    fn enable(&self);
    fn disable(&self);
    fn set_tx_buffer(&self, buf: *const u8, maxcnt: u8);
    fn set_rx_buffer(&self, buf: *mut u8, maxcnt: u8);
    /// Turn off EasyDMA list mode for both directions.
    fn clear_lists(&self);
    fn end_event(&self) -> bool;
    fn clear_end_event(&self);
    fn enable_end_interrupt(&self);
    fn disable_end_interrupt(&self);
    fn start(&self);
    fn stop(&self);
    /// Bus address of `TASKS_STOP`, for use as a PPI task endpoint.
    fn stop_task_address(&self) -> u32;
    /// Whether EasyDMA can read `len` bytes at `addr`, beyond the data RAM
    /// bounds the driver already checks.
    fn is_dma_reachable(&self, addr: usize, len: usize) -> bool;
}

impl SpimRegisterBlock for SpimRegisters {
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

    fn set_overread_character(&self, orc: u8) {
        self.orc.set(orc.into());
    }

    fn enable(&self) {
        self.enable.write(ENABLE::ENABLE::Enable);
    }

    fn disable(&self) {
        self.enable.write(ENABLE::ENABLE::Disable);
    }

    fn set_tx_buffer(&self, buf: *const u8, maxcnt: u8) {
        self.txd_ptr.set(buf as usize as u32);
        self.txd_maxcnt.write(MAXCNT::MAXCNT.val(maxcnt.into()));
    }

    fn set_rx_buffer(&self, buf: *mut u8, maxcnt: u8) {
        self.rxd_ptr.set(buf as usize as u32);
        self.rxd_maxcnt.write(MAXCNT::MAXCNT.val(maxcnt.into()));
    }

    fn clear_lists(&self) {
        self.rxd_list.set(0);
        self.txd_list.set(0);
    }

    fn end_event(&self) -> bool {
        self.events_end.is_set(EVENT::EVENT)
    }

    fn clear_end_event(&self) {
        self.events_end.write(EVENT::EVENT::CLEAR);
    }

    fn enable_end_interrupt(&self) {
        self.intenset.write(INTE::END::SET);
    }

    fn disable_end_interrupt(&self) {
        self.intenclr.write(INTE::END::SET);
    }

    fn start(&self) {
        self.tasks_start.write(TASK::TASK::SET);
    }

    fn stop(&self) {
        self.tasks_stop.write(TASK::TASK::SET);
    }

    fn stop_task_address(&self) -> u32 {
        &self.tasks_stop as *const WriteOnly<u32, TASK::Register> as usize as u32
    }

    fn is_dma_reachable(&self, _addr: usize, _len: usize) -> bool {
        true
    }
}

/// Pins of one `SPIM` instance.
#[derive(Copy, Clone, Debug)]
pub struct SpimPins {
    pub sck: Pinmux,
    pub mosi: Pinmux,
    pub miso: Pinmux,
}

/// An SPI master device.
pub struct Spim<'a, R: SpimRegisterBlock> {
    registers: &'a R,
    pins: SpimPins,
    gpio: &'a Port,
    stop: SingleByteStop<'a>,
    irq: &'a dyn InterruptLine,
    data_ram: Range<usize>,
}

impl<'a, R: SpimRegisterBlock> Spim<'a, R> {
    pub fn new(
        registers: &'a R,
        pins: SpimPins,
        gpio: &'a Port,
        stop: SingleByteStop<'a>,
        irq: &'a dyn InterruptLine,
        data_ram: Range<usize>,
    ) -> Self {
        Spim {
            registers,
            pins,
            gpio,
            stop,
            irq,
            data_ram,
        }
    }

    fn in_data_ram(&self, addr: usize, len: usize) -> bool {
        addr >= self.data_ram.start
            && addr
                .checked_add(len)
                .is_some_and(|end| end <= self.data_ram.end)
    }

    fn program(&self, tx: *const u8, tx_len: u8, rx: *mut u8, rx_len: u8) {
        self.registers.set_tx_buffer(tx, tx_len);
        self.registers.set_rx_buffer(rx, rx_len);
        self.registers.clear_end_event();
        self.registers.start();
    }
}

impl<R: SpimRegisterBlock> SpiBusController for Spim<'_, R> {
    const MAX_CHUNK: usize = u8::MAX as usize;

    fn init(&self) {
        self.gpio[self.pins.sck].make_output();
        self.gpio[self.pins.mosi].make_output();
        self.gpio[self.pins.miso].make_input();
        self.registers
            .select_pins(self.pins.sck, self.pins.mosi, self.pins.miso);
        self.registers.set_overread_character(0);
        self.irq.enable();
    }

    fn configure(&self, mode: Mode, rate_hz: u32) -> Result<u32, ErrorCode> {
        if rate_hz == 0 {
            return Err(ErrorCode::INVAL);
        }
        let freq = Frequency::from(rate_hz);
        self.registers.configure(mode, DataOrder::MSBFirst);
        self.registers.set_frequency(freq);
        self.registers.enable();
        Ok(freq.into())
    }

    fn shutdown(&self) {
        self.registers.disable();
    }

    fn is_dma_reachable(&self, buf: &[u8]) -> bool {
        let addr = buf.as_ptr() as usize;
        self.in_data_ram(addr, buf.len()) && self.registers.is_dma_reachable(addr, buf.len())
    }

    fn transfer_chunk(
        &self,
        chunk: Chunk<'_>,
        completion: &dyn ChunkCompletion,
    ) -> Result<(), ErrorCode> {
        let len = u8::try_from(chunk.len).map_err(|_| ErrorCode::SIZE)?;
        let (tx, tx_len) = chunk.tx.map_or((ptr::null(), 0), |b| (b.as_ptr(), len));
        let (rx, rx_len) = chunk
            .rx
            .map_or((ptr::null_mut(), 0), |b| (b.as_mut_ptr(), len));

        self.registers.clear_lists();

        let result = if chunk.single_byte {
            let _armed = self
                .stop
                .arm(self.pins.sck, self.registers.stop_task_address());
            self.program(tx, tx_len, rx, rx_len);
            let result = completion.spin_until(&mut || self.registers.end_event());
            self.registers.clear_end_event();
            result
        } else {
            completion.prepare();
            // A stale END would fire as soon as the interrupt is enabled.
            self.registers.clear_end_event();
            self.registers.enable_end_interrupt();
            self.program(tx, tx_len, rx, rx_len);
            let result = completion.wait();
            self.registers.disable_end_interrupt();
            result
        };

        if result.is_err() {
            self.registers.stop();
        }
        result
    }

    fn handle_interrupt(&self) -> bool {
        if self.registers.end_event() {
            self.registers.clear_end_event();
            true
        } else {
            false
        }
    }
}
