// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Workaround for nRF52832 anomaly 58 (FTPAN-58): "SPIM: An additional byte
//! is clocked out when RXD.MAXCNT == 1 and TXD.MAXCNT <= 1".
//!
//! A GPIOTE channel generates an event when SCK toggles, and a PPI channel
//! routes that event to the SPIM's `TASKS_STOP`. The SPIM cannot stop
//! mid-byte, so it finishes the first byte and then stops.
//!
//! Must not stay armed across multi-byte transfers: it would cut them off
//! after their first byte.

use kernel::hil::gpio::InterruptEdge;
use nrf5x::gpio::Gpiote;
use nrf5x::pinmux::Pinmux;

use crate::ppi::Ppi;

/// The GPIOTE and PPI channel pair reserved for one SPIM instance.
pub struct SingleByteStop<'a> {
    gpiote: &'a Gpiote,
    ppi: &'a Ppi<'a>,
    channel: usize,
}

impl<'a> SingleByteStop<'a> {
    /// `channel` is used both as the GPIOTE and the PPI channel. Boards use
    /// the bus index.
    pub const fn new(gpiote: &'a Gpiote, ppi: &'a Ppi<'a>, channel: usize) -> Self {
        SingleByteStop {
            gpiote,
            ppi,
            channel,
        }
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Stop the SPIM whose `TASKS_STOP` is at `stop_task` on the first edge of
    /// `sck`. The link is disabled when the returned guard is dropped.
    pub fn arm(&self, sck: Pinmux, stop_task: u32) -> ArmedStop<'_, 'a> {
        self.gpiote
            .configure_event(self.channel, sck, InterruptEdge::EitherEdge);
        self.ppi.connect(
            self.channel,
            self.gpiote.event_in_address(self.channel),
            stop_task,
        );
        self.ppi.enable(self.channel);
        ArmedStop { stop: self }
    }

    pub fn is_armed(&self) -> bool {
        self.ppi.is_enabled(self.channel)
    }
}

/// An armed stop link. Disarms on drop.
pub struct ArmedStop<'s, 'a> {
    stop: &'s SingleByteStop<'a>,
}

impl Drop for ArmedStop<'_, '_> {
    fn drop(&mut self) {
        self.stop.ppi.disable(self.stop.channel);
    }
}
