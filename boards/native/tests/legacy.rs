// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! nRF51 polled SPI buses end to end.

use capsules_core::spi_bus::BusConfig;
use kernel::hil::gpio::Pin;
use kernel::hil::spi::{DataOrder, Mode};
use kernel::ErrorCode;
use native_board::board::{Nrf51Board, SPI_PINS};
use native_board::sim::pin::SimPin;
use native_board::sim::slave::SimSlave;
use nrf5x::spi::Frequency;

fn leak<T: 'static>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

fn setup(config: BusConfig) -> (&'static Nrf51Board, &'static SimSlave, &'static SimPin) {
    let board = Nrf51Board::new(config);
    let cs = leak(SimPin::new("cs"));
    let slave = leak(SimSlave::new(Some(cs), 0xFF));
    board.spis[0].wire().attach(slave);
    let bus = board.spi.bus(0).unwrap();
    bus.init();
    bus.init_cs(cs).unwrap();
    cs.clear_history();
    (board, slave, cs)
}

#[test]
fn acquire_powers_on_and_release_powers_off() {
    let (board, _slave, _cs) = setup(BusConfig::default());
    let sim = board.spis[0];
    let pins = SPI_PINS[0];
    assert_eq!(sim.pins(), Some((pins.sck, pins.mosi, pins.miso)));
    assert!(!sim.is_powered());

    let spi = board
        .spi
        .bus(0)
        .unwrap()
        .acquire(None, Mode::Mode1, 250_000)
        .unwrap();
    assert_eq!(spi.rate(), 250_000);
    assert!(sim.is_powered() && sim.is_enabled());
    assert_eq!(sim.mode(), Some((Mode::Mode1, DataOrder::MSBFirst)));
    assert_eq!(sim.frequency(), Some(Frequency::from(250_000)));
    spi.release();

    assert!(!sim.is_powered());
    assert!(!sim.is_enabled());
}

#[test]
fn bytes_are_exchanged_without_chunking() {
    let (board, slave, pin) = setup(BusConfig::default());
    let cs: &dyn Pin = pin;
    let out: Vec<u8> = (0..300).map(|i| (i % 256) as u8).collect();
    let reply: Vec<u8> = out.iter().map(|b| !b).collect();
    slave.reply_with(&reply);

    let mut spi = board
        .spi
        .bus(0)
        .unwrap()
        .acquire(Some(cs), Mode::Mode0, 4_000_000)
        .unwrap();
    let mut inp = vec![0u8; 300];
    spi.transfer_bytes(Some(cs), false, Some(&out[..]), Some(&mut inp[..]), 300)
        .unwrap();
    spi.release();

    assert_eq!(slave.received(), out);
    assert_eq!(inp, reply);
    // One assertion of chip select for the whole transfer.
    assert_eq!(pin.edges(), [false, true]);
}

#[test]
fn read_only_transfer_sends_zero() {
    let (board, slave, pin) = setup(BusConfig::default());
    let cs: &dyn Pin = pin;
    slave.reply_with(&[0x12, 0x34, 0x56]);

    let mut spi = board
        .spi
        .bus(0)
        .unwrap()
        .acquire(Some(cs), Mode::Mode0, 1_000_000)
        .unwrap();
    let mut inp = [0u8; 3];
    spi.transfer_bytes(Some(cs), false, None, Some(&mut inp[..]), 3)
        .unwrap();
    spi.release();

    assert_eq!(inp, [0x12, 0x34, 0x56]);
    assert_eq!(slave.received(), [0, 0, 0]);
}

#[test]
fn register_write_then_read() {
    let (board, slave, pin) = setup(BusConfig::default());
    let cs: &dyn Pin = pin;
    slave.reply_with(&[0x00, 0xA5]);

    let mut spi = board
        .spi
        .bus(0)
        .unwrap()
        .acquire(Some(cs), Mode::Mode3, 1_000_000)
        .unwrap();
    assert_eq!(spi.transfer_reg(Some(cs), 0x8F, 0x00), Ok(0xA5));
    spi.release();

    assert_eq!(slave.received(), [0x8F, 0x00]);
    assert_eq!(pin.edges(), [false, true]);
}

#[test]
fn stuck_ready_times_out_and_deselects() {
    let (board, slave, pin) = setup(BusConfig {
        transfer_timeout_ms: None,
        spin_limit: Some(1_000),
    });
    let cs: &dyn Pin = pin;
    board.spis[0].set_hang(true);

    let mut spi = board
        .spi
        .bus(0)
        .unwrap()
        .acquire(Some(cs), Mode::Mode0, 1_000_000)
        .unwrap();
    assert_eq!(
        spi.transfer_bytes(Some(cs), false, Some(&[1, 2, 3][..]), None, 3),
        Err(ErrorCode::BUSY)
    );
    spi.release();

    assert!(!pin.is_low());
    assert!(slave.received().is_empty());
    assert!(!board.spis[0].is_powered());
}

#[test]
fn second_bus_is_separate() {
    let board = Nrf51Board::new(BusConfig::default());
    let bus = board.spi.bus(1).unwrap();
    bus.init();
    let mut spi = bus.acquire(None, Mode::Mode0, 125_000).unwrap();
    spi.transfer_bytes(None, false, Some(&[9, 8][..]), None, 2)
        .unwrap();
    spi.release();

    assert_eq!(board.spis[1].wire().clocked(), [9, 8]);
    assert!(board.spis[0].wire().clocked().is_empty());
    assert!(board.spi.bus(2).is_none());
}
