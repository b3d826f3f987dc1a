// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Blocking, shared access to SPI buses.
//!
//! A [`BusRegistry`] owns one [`SpiBus`] per controller. Each bus carries the
//! lock that serializes its users, the record of the thread waiting for the
//! current chunk, and a scratch buffer for outgoing data the controller
//! cannot read directly (for example, constants in flash).
//!
//! Usage
//! -----
//!
//! ```ignore
//! let bus = registry.bus(0).unwrap();
//! bus.init();
//! bus.init_cs(&cs_pin)?;
//!
//! let mut spi = bus.acquire(Some(&cs_pin), Mode::Mode0, 1_000_000)?;
//! spi.transfer_bytes(Some(&cs_pin), false, Some(&cmd), Some(&mut reply), 3)?;
//! spi.release();
//! ```
//!
//! Chip select is driven by the transfer calls, not by `acquire`: a caller
//! may keep it asserted across several transfers by passing `cont = true`.

use core::cell::Cell;
use core::hint;

use kernel::debug;
use kernel::hil::gpio;
use kernel::hil::spi::{ChipSelect, Chunk, ChunkCompletion, Mode, SpiBusController};
use kernel::threads::{
    CompletionSignal, Mutex, MutexGuard, RawMutex, ThreadFlags, THREAD_FLAG_SPI_BUS,
};
use kernel::ErrorCode;

/// Size of the per-bus scratch buffer, one EasyDMA chunk.
pub const SCRATCH_LEN: usize = 255;

/// Per-bus tuning, set by the board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BusConfig {
    /// How long to wait for a chunk's completion interrupt. `None` waits
    /// forever.
    pub transfer_timeout_ms: Option<u32>,
    /// How many polls of a busy-waited completion flag to make before giving
    /// up. `None` polls forever.
    pub spin_limit: Option<u32>,
}

/// One SPI bus: the controller plus the state shared by its users.
pub struct SpiBus<'a, C: SpiBusController, M: RawMutex, F: ThreadFlags> {
    index: usize,
    controller: &'a C,
    /// The bus lock. It guards the scratch buffer.
    scratch: Mutex<M, [u8; SCRATCH_LEN]>,
    completion: CompletionSignal<'a, F>,
    config: BusConfig,
    initialized: critical_section::Mutex<Cell<bool>>,
    spurious: critical_section::Mutex<Cell<usize>>,
}

impl<'a, C: SpiBusController, M: RawMutex + Default, F: ThreadFlags> SpiBus<'a, C, M, F> {
    pub fn new(index: usize, controller: &'a C, flags: &'a F, config: BusConfig) -> Self {
        SpiBus {
            index,
            controller,
            scratch: Mutex::new([0; SCRATCH_LEN]),
            completion: CompletionSignal::new(flags, THREAD_FLAG_SPI_BUS),
            config,
            initialized: critical_section::Mutex::new(Cell::new(false)),
            spurious: critical_section::Mutex::new(Cell::new(0)),
        }
    }
}

impl<'a, C: SpiBusController, M: RawMutex, F: ThreadFlags> SpiBus<'a, C, M, F> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn controller(&self) -> &'a C {
        self.controller
    }

    pub fn config(&self) -> BusConfig {
        self.config
    }

    /// Bind the bus pins and enable its interrupt line. Calls after the
    /// first are ignored.
    pub fn init(&self) {
        let already = critical_section::with(|cs| self.initialized.borrow(cs).replace(true));
        if !already {
            self.controller.init();
        }
    }

    pub fn is_initialized(&self) -> bool {
        critical_section::with(|cs| self.initialized.borrow(cs).get())
    }

    /// Configure `cs` as an output, deasserted (high).
    pub fn init_cs(&self, cs: &dyn gpio::Pin) -> Result<(), ErrorCode> {
        if !self.is_initialized() {
            return Err(ErrorCode::NODEVICE);
        }
        cs.make_output();
        cs.set();
        Ok(())
    }

    /// Take exclusive ownership of the bus, blocking while another thread
    /// holds it, and configure it for `mode` at (at most) `rate_hz`.
    ///
    /// Chip select is not touched here; it is accepted so callers can pass
    /// the same arguments they pass to the transfers.
    pub fn acquire(
        &self,
        _cs: ChipSelect<'_>,
        mode: Mode,
        rate_hz: u32,
    ) -> Result<AcquiredBus<'_, 'a, C, M, F>, ErrorCode> {
        if rate_hz == 0 {
            return Err(ErrorCode::INVAL);
        }
        let scratch = self.scratch.lock();
        let rate_hz = self.controller.configure(mode, rate_hz)?;
        Ok(AcquiredBus {
            bus: self,
            scratch,
            rate_hz,
        })
    }

    /// Completion interrupt entry point, called from interrupt context.
    ///
    /// Returns `true` if a waiting thread was woken.
    pub fn handle_interrupt(&self) -> bool {
        if self.controller.handle_interrupt() && self.completion.signal() {
            return true;
        }
        let count = critical_section::with(|cs| {
            let spurious = self.spurious.borrow(cs);
            spurious.set(spurious.get() + 1);
            spurious.get()
        });
        debug!("spi{}: spurious interrupt ({} so far)", self.index, count);
        false
    }

    /// Number of completion interrupts that found nothing to complete.
    pub fn spurious_interrupts(&self) -> usize {
        critical_section::with(|cs| self.spurious.borrow(cs).get())
    }
}

/// Exclusive ownership of a bus, from `acquire` until `release` or drop.
///
/// Releasing disables (and where supported powers down) the controller, then
/// unlocks the bus.
pub struct AcquiredBus<'b, 'a, C: SpiBusController, M: RawMutex, F: ThreadFlags> {
    bus: &'b SpiBus<'a, C, M, F>,
    scratch: MutexGuard<'b, M, [u8; SCRATCH_LEN]>,
    rate_hz: u32,
}

impl<C: SpiBusController, M: RawMutex, F: ThreadFlags> AcquiredBus<'_, '_, C, M, F> {
    /// Clock rate the controller actually runs at.
    pub fn rate(&self) -> u32 {
        self.rate_hz
    }

    pub fn release(self) {}

    /// Clock `len` bytes out of `out` (or filler bytes) and into `inp`.
    ///
    /// Asserts `cs` before the first byte and deasserts it after the last
    /// unless `cont` is set. Returns once every byte has been transferred.
    ///
    /// # Panics
    ///
    /// If both buffers are `None`, or if a buffer is shorter than `len`.
    pub fn transfer_bytes(
        &mut self,
        cs: ChipSelect<'_>,
        cont: bool,
        out: Option<&[u8]>,
        inp: Option<&mut [u8]>,
        len: usize,
    ) -> Result<(), ErrorCode> {
        assert!(
            out.is_some() || inp.is_some(),
            "spi transfer without a buffer"
        );
        assert!(out.is_none_or(|b| b.len() >= len));
        assert!(inp.as_deref().is_none_or(|b| b.len() >= len));

        if let Some(cs) = cs {
            cs.clear();
        }
        let result = self.run_chunks(out, inp, len);
        if let Some(cs) = cs {
            if !cont {
                cs.set();
            }
        }
        if let Err(e) = result {
            debug!("spi{}: transfer of {} bytes failed: {:?}", self.bus.index, len, e);
        }
        result
    }

    fn run_chunks(
        &mut self,
        out: Option<&[u8]>,
        mut inp: Option<&mut [u8]>,
        len: usize,
    ) -> Result<(), ErrorCode> {
        let completion = ChunkWaiter {
            signal: &self.bus.completion,
            config: self.bus.config,
        };
        let mut done = 0;
        while done < len {
            let mut chunk_len = (len - done).min(C::MAX_CHUNK);
            let tx = match out {
                Some(buf) if !self.bus.controller.is_dma_reachable(&buf[done..done + chunk_len]) => {
                    chunk_len = chunk_len.min(SCRATCH_LEN);
                    self.scratch[..chunk_len].copy_from_slice(&buf[done..done + chunk_len]);
                    Some(&self.scratch[..chunk_len])
                }
                Some(buf) => Some(&buf[done..done + chunk_len]),
                None => None,
            };
            let rx = inp
                .as_deref_mut()
                .map(|buf| &mut buf[done..done + chunk_len]);

            self.bus.controller.transfer_chunk(
                Chunk {
                    tx,
                    rx,
                    len: chunk_len,
                    single_byte: len == 1,
                },
                &completion,
            )?;
            done += chunk_len;
        }
        Ok(())
    }

    /// Exchange a single byte.
    pub fn transfer_byte(&mut self, cs: ChipSelect<'_>, cont: bool, out: u8) -> Result<u8, ErrorCode> {
        let mut inp = [0u8];
        self.transfer_bytes(cs, cont, Some(&[out][..]), Some(&mut inp[..]), 1)?;
        Ok(inp[0])
    }

    /// Send register address `reg`, then exchange one byte with it.
    pub fn transfer_reg(&mut self, cs: ChipSelect<'_>, reg: u8, out: u8) -> Result<u8, ErrorCode> {
        self.select_reg(cs, reg)?;
        self.transfer_byte(cs, false, out)
    }

    /// Send register address `reg`, then exchange `len` bytes with it.
    pub fn transfer_regs(
        &mut self,
        cs: ChipSelect<'_>,
        reg: u8,
        out: Option<&[u8]>,
        inp: Option<&mut [u8]>,
        len: usize,
    ) -> Result<(), ErrorCode> {
        self.select_reg(cs, reg)?;
        self.transfer_bytes(cs, false, out, inp, len)
    }

    fn select_reg(&mut self, cs: ChipSelect<'_>, reg: u8) -> Result<(), ErrorCode> {
        self.transfer_byte(cs, true, reg).map(|_| ()).inspect_err(|_| {
            if let Some(cs) = cs {
                cs.set();
            }
        })
    }
}

impl<C: SpiBusController, M: RawMutex, F: ThreadFlags> Drop for AcquiredBus<'_, '_, C, M, F> {
    fn drop(&mut self) {
        self.bus.controller.shutdown();
    }
}

/// The wait capability handed to the controller for one transfer.
struct ChunkWaiter<'s, 'a, F: ThreadFlags> {
    signal: &'s CompletionSignal<'a, F>,
    config: BusConfig,
}

impl<F: ThreadFlags> ChunkCompletion for ChunkWaiter<'_, '_, F> {
    fn prepare(&self) {
        self.signal.prepare();
    }

    fn wait(&self) -> Result<(), ErrorCode> {
        self.signal.wait(self.config.transfer_timeout_ms)
    }

    fn spin_until(&self, done: &mut dyn FnMut() -> bool) -> Result<(), ErrorCode> {
        match self.config.spin_limit {
            None => {
                while !done() {
                    hint::spin_loop();
                }
                Ok(())
            }
            Some(limit) => {
                for _ in 0..limit {
                    if done() {
                        return Ok(());
                    }
                    hint::spin_loop();
                }
                Err(ErrorCode::BUSY)
            }
        }
    }
}

/// All SPI buses of a board, indexed by logical bus number.
pub struct BusRegistry<'a, C: SpiBusController, M: RawMutex, F: ThreadFlags, const N: usize> {
    buses: [SpiBus<'a, C, M, F>; N],
}

impl<'a, C: SpiBusController, M: RawMutex + Default, F: ThreadFlags, const N: usize>
    BusRegistry<'a, C, M, F, N>
{
    /// Bus `i` is driven by `controllers[i]`.
    pub fn new(controllers: [&'a C; N], flags: &'a F, config: BusConfig) -> Self {
        BusRegistry {
            buses: core::array::from_fn(|i| SpiBus::new(i, controllers[i], flags, config)),
        }
    }
}

impl<'a, C: SpiBusController, M: RawMutex, F: ThreadFlags, const N: usize>
    BusRegistry<'a, C, M, F, N>
{
    pub fn bus(&self, index: usize) -> Option<&SpiBus<'a, C, M, F>> {
        self.buses.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpiBus<'a, C, M, F>> {
        self.buses.iter()
    }

    /// Route the completion interrupt of bus `index`.
    pub fn handle_interrupt(&self, index: usize) -> bool {
        match self.buses.get(index) {
            Some(bus) => bus.handle_interrupt(),
            None => {
                debug!("spi: interrupt for unknown bus {}", index);
                false
            }
        }
    }
}
