// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! GPIO and GPIOTE (task and events), nRF5x-family
//!
//! The nRF5x doesn't automatically provide GPIO events. Instead, to get an
//! event from a GPIO line, a GPIOTE (GPIO Task and Event) channel must be
//! bound to the desired pin. Events can then be routed to tasks of other
//! peripherals through the PPI.

use core::ops::Index;

use kernel::hil;
use kernel::utilities::registers::interfaces::{ReadWriteable, Readable, Writeable};
use kernel::utilities::registers::{register_bitfields, register_structs, ReadWrite};
use kernel::utilities::StaticRef;

use crate::pinmux::Pinmux;

/// Number of GPIOTE channels.
pub const NUM_GPIOTE: usize = 8;

pub const GPIO_BASE: StaticRef<GpioRegisters> =
    unsafe { StaticRef::new(0x5000_0000 as *const GpioRegisters) };

pub const GPIOTE_BASE: StaticRef<GpioteRegisters> =
    unsafe { StaticRef::new(0x4000_6000 as *const GpioteRegisters) };

register_structs! {
    pub GpioRegisters {
        (0x000 => _reserved0),
        (0x504 => out: ReadWrite<u32>),
        (0x508 => outset: ReadWrite<u32>),
        (0x50C => outclr: ReadWrite<u32>),
        (0x510 => in_: ReadWrite<u32>),
        (0x514 => _reserved1),
        (0x700 => pin_cnf: [ReadWrite<u32, PinConfig::Register>; 32]),
        (0x780 => @END),
    },

    pub GpioteRegisters {
        (0x000 => _reserved0),
        (0x100 => events_in: [ReadWrite<u32>; NUM_GPIOTE]),
        (0x120 => _reserved1),
        (0x510 => config: [ReadWrite<u32, GpioteConfig::Register>; NUM_GPIOTE]),
        (0x530 => @END),
    }
}

register_bitfields! [u32,
    PinConfig [
        DIR OFFSET(0) NUMBITS(1) [
            Input = 0,
            Output = 1
        ],
        INPUT OFFSET(1) NUMBITS(1) [
            Connect = 0,
            Disconnect = 1
        ],
        PULL OFFSET(2) NUMBITS(2) [
            Disabled = 0,
            Pulldown = 1,
            Pullup = 3
        ],
        DRIVE OFFSET(8) NUMBITS(3) [],
        SENSE OFFSET(16) NUMBITS(2) []
    ],
    GpioteConfig [
        MODE OFFSET(0) NUMBITS(2) [
            Disabled = 0,
            Event = 1,
            Task = 3
        ],
        PSEL OFFSET(8) NUMBITS(5) [],
        POLARITY OFFSET(16) NUMBITS(2) [
            None = 0,
            LoToHi = 1,
            HiToLo = 2,
            Toggle = 3
        ],
        OUTINIT OFFSET(20) NUMBITS(1) []
    ]
];

pub struct GPIOPin {
    pin: u8,
    registers: StaticRef<GpioRegisters>,
}

impl GPIOPin {
    pub const fn new(pin: u8, registers: StaticRef<GpioRegisters>) -> GPIOPin {
        GPIOPin { pin, registers }
    }

    fn mask(&self) -> u32 {
        1 << self.pin
    }
}

impl hil::gpio::Configure for GPIOPin {
    fn configuration(&self) -> hil::gpio::Configuration {
        let cnf = &self.registers.pin_cnf[self.pin as usize];
        let output = cnf.matches_all(PinConfig::DIR::Output);
        let input = cnf.matches_all(PinConfig::INPUT::Connect);
        match (output, input) {
            (true, true) => hil::gpio::Configuration::InputOutput,
            (true, false) => hil::gpio::Configuration::Output,
            (false, true) => hil::gpio::Configuration::Input,
            (false, false) => hil::gpio::Configuration::LowPower,
        }
    }

    fn make_output(&self) -> hil::gpio::Configuration {
        self.registers.pin_cnf[self.pin as usize]
            .modify(PinConfig::DIR::Output + PinConfig::INPUT::Disconnect);
        hil::gpio::Configure::configuration(self)
    }

    fn make_input(&self) -> hil::gpio::Configuration {
        self.registers.pin_cnf[self.pin as usize]
            .modify(PinConfig::DIR::Input + PinConfig::INPUT::Connect);
        hil::gpio::Configure::configuration(self)
    }
}

impl hil::gpio::Output for GPIOPin {
    fn set(&self) {
        self.registers.outset.set(self.mask());
    }

    fn clear(&self) {
        self.registers.outclr.set(self.mask());
    }

    fn toggle(&self) -> bool {
        let out = self.registers.out.get() ^ self.mask();
        self.registers.out.set(out);
        out & self.mask() != 0
    }
}

impl hil::gpio::Input for GPIOPin {
    fn read(&self) -> bool {
        let port = if hil::gpio::Configure::is_output(self) {
            self.registers.out.get()
        } else {
            self.registers.in_.get()
        };
        port & self.mask() != 0
    }
}

impl hil::gpio::Pin for GPIOPin {}

/// The 32 pins of one GPIO port.
pub struct Port {
    pins: [GPIOPin; 32],
}

impl Port {
    pub fn new(registers: StaticRef<GpioRegisters>) -> Port {
        Port {
            pins: core::array::from_fn(|i| GPIOPin::new(i as u8, registers)),
        }
    }
}

impl Index<usize> for Port {
    type Output = GPIOPin;

    fn index(&self, index: usize) -> &GPIOPin {
        &self.pins[index]
    }
}

impl Index<Pinmux> for Port {
    type Output = GPIOPin;

    fn index(&self, pin: Pinmux) -> &GPIOPin {
        &self.pins[pin.index()]
    }
}

/// GPIOTE channels. Channels are assigned by the board; this driver does not
/// allocate them.
pub struct Gpiote {
    registers: StaticRef<GpioteRegisters>,
}

impl Gpiote {
    pub const fn new(registers: StaticRef<GpioteRegisters>) -> Gpiote {
        Gpiote { registers }
    }

    /// Generate an event on `channel` whenever `pin` sees `edge`.
    pub fn configure_event(&self, channel: usize, pin: Pinmux, edge: hil::gpio::InterruptEdge) {
        let polarity = match edge {
            hil::gpio::InterruptEdge::RisingEdge => GpioteConfig::POLARITY::LoToHi,
            hil::gpio::InterruptEdge::FallingEdge => GpioteConfig::POLARITY::HiToLo,
            hil::gpio::InterruptEdge::EitherEdge => GpioteConfig::POLARITY::Toggle,
        };
        self.registers.events_in[channel].set(0);
        self.registers.config[channel].write(
            GpioteConfig::MODE::Event + GpioteConfig::PSEL.val(pin.index() as u32) + polarity,
        );
    }

    pub fn disable_channel(&self, channel: usize) {
        self.registers.config[channel].write(GpioteConfig::MODE::Disabled);
    }

    /// Pin bound to `channel` if it is in event mode.
    pub fn event_pin(&self, channel: usize) -> Option<u32> {
        let config = &self.registers.config[channel];
        if config.matches_all(GpioteConfig::MODE::Event) {
            Some(config.read(GpioteConfig::PSEL))
        } else {
            None
        }
    }

    /// Bus address of `EVENTS_IN[channel]`, for use as a PPI event endpoint.
    pub fn event_in_address(&self, channel: usize) -> u32 {
        &self.registers.events_in[channel] as *const ReadWrite<u32> as usize as u32
    }
}
