// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Reads one sample from a simulated XPT2046 resistive touch controller on
//! SPIM0 and a status byte from a second device sharing the bus.

use capsules_core::spi_bus::BusConfig;
use capsules_core::spi_device::SpiBusDevice;
use embedded_hal::spi::SpiDevice;
use kernel::debug;
use kernel::errorcode::into_statuscode;
use kernel::hil::gpio::Pin;
use kernel::hil::spi::Mode;
use kernel::ErrorCode;
use native_board::board::Nrf52Board;
use native_board::io::Writer;
use native_board::sim::pin::SimPin;
use native_board::sim::slave::SimSlave;

/// XPT2046 control bytes: start bit, channel, 12-bit, differential.
const XPT2046_READ_X: u8 = 0xD0;
const XPT2046_READ_Y: u8 = 0x90;

static TOUCH_CS: SimPin = SimPin::new("touch_cs");
static FLASH_CS: SimPin = SimPin::new("flash_cs");

/// Status register read command, in flash on a real board.
static READ_STATUS: [u8; 1] = [0x05];

fn run(board: &'static Nrf52Board) -> Result<(), ErrorCode> {
    let spim = board.spims[0];
    let touch: &'static SimSlave = Box::leak(Box::new(SimSlave::new(Some(&TOUCH_CS), 0x00)));
    let flash: &'static SimSlave = Box::leak(Box::new(SimSlave::new(Some(&FLASH_CS), 0xFF)));
    spim.wire().attach(touch);
    spim.wire().attach(flash);
    spim.place_in_flash(&READ_STATUS);

    // Each conversion answers with 12 bits, MSB aligned after a busy bit.
    touch.reply_with(&[0x00, 0x3A, 0x80, 0x00, 0x1F, 0x40]);
    flash.reply_with(&[0xFF, 0x02]);

    let bus = board.spi.bus(0).ok_or(ErrorCode::NODEVICE)?;
    bus.init();
    let touch_cs: &'static dyn Pin = &TOUCH_CS;
    bus.init_cs(touch_cs)?;

    let mut spi = bus.acquire(Some(touch_cs), Mode::Mode0, 2_000_000)?;
    let mut sample = [0u16; 2];
    for (value, command) in sample.iter_mut().zip([XPT2046_READ_X, XPT2046_READ_Y]) {
        let mut rx = [0u8; 3];
        let tx = [command, 0, 0];
        spi.transfer_bytes(Some(touch_cs), false, Some(&tx[..]), Some(&mut rx[..]), 3)?;
        *value = u16::from_be_bytes([rx[1], rx[2]]) >> 3;
    }
    debug!("touch: x={} y={} at {} Hz", sample[0], sample[1], spi.rate());
    spi.release();

    let mut flash_dev = SpiBusDevice::new(bus, &FLASH_CS, Mode::Mode0, 8_000_000)?;
    let mut status = [0u8; 2];
    flash_dev
        .transfer(&mut status[..], &READ_STATUS[..])
        .map_err(|e| e.0)?;
    debug!("flash: status={:#04x}", status[1]);

    debug!("spim0: {} transfers", spim.transfers().len());
    for bus in board.spi.iter().filter(|bus| bus.is_initialized()) {
        debug!(
            "spi{}: {} spurious interrupts",
            bus.index(),
            bus.spurious_interrupts()
        );
    }
    Ok(())
}

fn main() {
    kernel::debug::set_debug_writer(&Writer);
    let board = Nrf52Board::new(BusConfig {
        transfer_timeout_ms: Some(100),
        spin_limit: Some(1_000_000),
    });
    let status = into_statuscode(run(board));
    if status != 0 {
        debug!("spi demo failed: {}", status);
    }
    std::process::exit(status as i32);
}
