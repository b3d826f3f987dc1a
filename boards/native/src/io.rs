// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Debug output sinks for the host board.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use kernel::debug::IoWrite;

/// Sends `debug!` output to stderr.
pub struct Writer;

impl IoWrite for Writer {
    fn write(&self, buf: &[u8]) -> usize {
        match std::io::stderr().write_all(buf) {
            Ok(()) => buf.len(),
            Err(_) => 0,
        }
    }
}

/// Keeps a copy of everything written, for tests that check log output.
/// Also forwards to stderr.
#[derive(Default)]
pub struct CaptureWriter {
    captured: Mutex<Vec<u8>>,
}

impl CaptureWriter {
    pub fn contents(&self) -> String {
        let captured = self.captured.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&captured).into_owned()
    }
}

impl IoWrite for CaptureWriter {
    fn write(&self, buf: &[u8]) -> usize {
        self.captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Writer.write(buf);
        buf.len()
    }
}
