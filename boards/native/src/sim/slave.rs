// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! SPI slaves and the wires connecting them to a master.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use super::pin::SimPin;

/// Level of MISO when no slave drives it.
pub const MISO_IDLE: u8 = 0xFF;

/// A slave that replies with programmed bytes and records what it receives.
///
/// Once the programmed replies run out it answers `fill`.
pub struct SimSlave {
    cs: Option<&'static SimPin>,
    fill: u8,
    replies: Mutex<VecDeque<u8>>,
    received: Mutex<Vec<u8>>,
}

impl SimSlave {
    /// A slave selected by `cs` going low, or always selected if `cs` is
    /// `None`.
    pub fn new(cs: Option<&'static SimPin>, fill: u8) -> SimSlave {
        SimSlave {
            cs,
            fill,
            replies: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_with(&self, bytes: &[u8]) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(bytes);
    }

    /// Bytes clocked in while selected, oldest first.
    pub fn received(&self) -> Vec<u8> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn selected(&self) -> bool {
        self.cs.is_none_or(|cs| cs.is_low())
    }

    fn exchange(&self, mosi: u8) -> u8 {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mosi);
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(self.fill)
    }
}

/// The SCK/MOSI/MISO lines of one bus.
#[derive(Default)]
pub struct SimWire {
    slaves: Mutex<Vec<&'static SimSlave>>,
    clocked: Mutex<Vec<u8>>,
}

impl SimWire {
    pub fn attach(&self, slave: &'static SimSlave) {
        self.slaves
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(slave);
    }

    /// Clock one byte. Selected slaves see `mosi`; their replies are wired
    /// AND onto MISO.
    pub fn clock(&self, mosi: u8) -> u8 {
        self.clocked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mosi);
        let slaves = self.slaves.lock().unwrap_or_else(PoisonError::into_inner);
        slaves
            .iter()
            .filter(|slave| slave.selected())
            .fold(MISO_IDLE, |miso, slave| miso & slave.exchange(mosi))
    }

    /// Every byte that appeared on MOSI, selected or not.
    pub fn clocked(&self) -> Vec<u8> {
        self.clocked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
