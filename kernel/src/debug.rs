// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for in-kernel debugging.
//!
//! For printing, this module exposes `debug!` and `debug_verbose!`. Both
//! format their arguments and hand the bytes to the `IoWrite` sink the board
//! registered with [`set_debug_writer`]. Messages are dropped until a board
//! registers a sink.
//!
//! ```ignore
//! debug!("Yes the code gets here with value {}", i);
//! debug_verbose!("got here"); // Includes message count, file, and line.
//! ```
//!
//! Both macros may be used from interrupt context. The sink is looked up
//! inside a critical section, but written to outside of it.

use core::cell::Cell;
use core::fmt::{self, Write};

use critical_section::Mutex;

/// A byte sink for debug output, provided by the board.
pub trait IoWrite: Sync {
    /// Write `buf` and return the number of bytes consumed.
    fn write(&self, buf: &[u8]) -> usize;
}

static DEBUG_WRITER: Mutex<Cell<Option<&'static dyn IoWrite>>> = Mutex::new(Cell::new(None));
static DEBUG_COUNT: Mutex<Cell<usize>> = Mutex::new(Cell::new(0));

/// Register the sink that `debug!` output goes to.
pub fn set_debug_writer(writer: &'static dyn IoWrite) {
    critical_section::with(|cs| DEBUG_WRITER.borrow(cs).set(Some(writer)));
}

fn debug_writer() -> Option<&'static dyn IoWrite> {
    critical_section::with(|cs| DEBUG_WRITER.borrow(cs).get())
}

struct DebugWriter(&'static dyn IoWrite);

impl Write for DebugWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let written = self.0.write(bytes);
            if written == 0 {
                return Err(fmt::Error);
            }
            bytes = &bytes[written..];
        }
        Ok(())
    }
}

/// Backend of `debug!`. Prefer the macro.
pub fn debug_println(args: fmt::Arguments) {
    if let Some(writer) = debug_writer() {
        let mut writer = DebugWriter(writer);
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    }
}

/// Backend of `debug_verbose!`. Prefer the macro.
pub fn debug_verbose_println(args: fmt::Arguments, file_line: &(&'static str, u32)) {
    let count = critical_section::with(|cs| {
        let count = DEBUG_COUNT.borrow(cs);
        count.set(count.get().wrapping_add(1));
        count.get()
    });
    if let Some(writer) = debug_writer() {
        let mut writer = DebugWriter(writer);
        let (file, line) = *file_line;
        let _ = writer.write_fmt(format_args!("TOCK_DEBUG({}): {}:{}: ", count, file, line));
        let _ = writer.write_fmt(args);
        let _ = writer.write_str("\r\n");
    }
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        $crate::debug!("")
    });
    ($($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($($arg)+))
    });
}

/// In-kernel `println()` debugging that includes the message count, file,
/// and line.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        $crate::debug_verbose!("")
    });
    ($($arg:tt)+) => ({
        $crate::debug::debug_verbose_println(format_args!($($arg)+), {
            static _FILE_LINE: (&'static str, u32) = (file!(), line!());
            &_FILE_LINE
        })
    });
}

#[cfg(test)]
mod tests {
    use std::string::String;
    use std::sync::Mutex;
    use std::vec::Vec;

    struct Capture(Mutex<Vec<u8>>);

    impl super::IoWrite for Capture {
        fn write(&self, buf: &[u8]) -> usize {
            // Short writes exercise the retry loop.
            let n = buf.len().min(7);
            self.0.lock().unwrap().extend_from_slice(&buf[..n]);
            n
        }
    }

    static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

    #[test]
    fn debug_reaches_registered_writer() {
        super::set_debug_writer(&CAPTURE);
        debug!("spi{}: {} spurious", 2, 1);
        debug_verbose!("verbose {}", "line");

        let out = String::from_utf8(CAPTURE.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("spi2: 1 spurious\r\n"));
        assert!(out.contains("TOCK_DEBUG("));
        assert!(out.contains("debug.rs:"));
        assert!(out.contains("verbose line\r\n"));
    }
}
