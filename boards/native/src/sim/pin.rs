// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! A GPIO line with a level history, used for chip selects.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use kernel::hil::gpio::{Configuration, Configure, Input, Output, Pin};

pub struct SimPin {
    name: &'static str,
    output: AtomicBool,
    /// Last driven level; `None` before the pin was first driven.
    level: Mutex<Option<bool>>,
    edges: Mutex<Vec<bool>>,
}

impl SimPin {
    pub const fn new(name: &'static str) -> SimPin {
        SimPin {
            name,
            output: AtomicBool::new(false),
            level: Mutex::new(None),
            edges: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Driven low. An undriven pin floats high.
    pub fn is_low(&self) -> bool {
        *self.level.lock().unwrap_or_else(PoisonError::into_inner) == Some(false)
    }

    /// Every level change, oldest first (`true` = high).
    pub fn edges(&self) -> Vec<bool> {
        self.edges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_history(&self) {
        self.edges
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn drive(&self, high: bool) {
        let mut level = self.level.lock().unwrap_or_else(PoisonError::into_inner);
        if *level != Some(high) {
            *level = Some(high);
            self.edges
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(high);
        }
    }
}

impl Configure for SimPin {
    fn configuration(&self) -> Configuration {
        if self.output.load(Ordering::SeqCst) {
            Configuration::Output
        } else {
            Configuration::Input
        }
    }

    fn make_output(&self) -> Configuration {
        self.output.store(true, Ordering::SeqCst);
        Configuration::Output
    }

    fn make_input(&self) -> Configuration {
        self.output.store(false, Ordering::SeqCst);
        Configuration::Input
    }
}

impl Output for SimPin {
    fn set(&self) {
        self.drive(true);
    }

    fn clear(&self) {
        self.drive(false);
    }

    fn toggle(&self) -> bool {
        let high = self.is_low();
        self.drive(high);
        high
    }
}

impl Input for SimPin {
    fn read(&self) -> bool {
        !self.is_low()
    }
}

impl Pin for SimPin {}
