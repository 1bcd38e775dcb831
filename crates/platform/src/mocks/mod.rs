//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits for use
//! in unit and integration tests. Every mock records the hardware traffic it
//! sees into fixed-capacity `heapless` buffers so tests can assert on exact
//! register writes and exact console output.

#![cfg(any(test, feature = "std"))]
// `-> !` trait methods have nothing to do on the host but stop the test.
#![allow(clippy::panic)]
// Fixed-size register files indexed by enum-derived positions.
#![allow(clippy::indexing_slicing)]

use core::cell::{Cell, RefCell};

use embedded_hal::delay::DelayNs;

use crate::*;

/// Capacity of the mock UART capture buffer.
pub const UART_CAPTURE_BYTES: usize = 8192;

/// Mock UART0 transmit FIFO
pub struct MockUart {
    output: heapless::Vec<u8, UART_CAPTURE_BYTES>,
    busy_polls: Cell<u32>,
    polls: Cell<u32>,
}

impl MockUart {
    /// Create a mock whose FIFO always has room.
    pub fn new() -> Self {
        Self {
            output: heapless::Vec::new(),
            busy_polls: Cell::new(0),
            polls: Cell::new(0),
        }
    }

    /// Report a full FIFO for the next `polls` fill-level reads.
    pub fn stall_for(&mut self, polls: u32) {
        self.busy_polls.set(polls);
    }

    /// Everything written so far, as text.
    pub fn output(&self) -> &str {
        core::str::from_utf8(&self.output).unwrap_or("<non-utf8 output>")
    }

    /// Raw bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.output
    }

    /// Number of fill-level reads observed.
    pub fn polls(&self) -> u32 {
        self.polls.get()
    }
}

impl Default for MockUart {
    fn default() -> Self {
        Self::new()
    }
}

impl TxFifo for MockUart {
    fn tx_fifo_count(&self) -> u8 {
        self.polls.set(self.polls.get().saturating_add(1));
        let busy = self.busy_polls.get();
        if busy > 0 {
            self.busy_polls.set(busy.saturating_sub(1));
            128
        } else {
            0
        }
    }

    fn write_fifo(&mut self, byte: u8) {
        // A full capture buffer behaves like a disconnected UART: bytes vanish.
        let _ = self.output.push(byte);
    }
}

/// Mock CPU: special-register file, core identity, stall and OCD state
pub struct MockCpu {
    registers: [u32; SpecialRegister::COUNT],
    writes: heapless::Vec<(SpecialRegister, u32), 64>,
    core: CoreId,
    stalled: Option<CoreId>,
    debugger: bool,
    debugger_breaks: u32,
    traps: u32,
    trap_limit: Option<u32>,
}

impl MockCpu {
    /// Create a mock running on `core` with no debugger attached.
    pub fn new(core: CoreId) -> Self {
        Self {
            registers: [0; SpecialRegister::COUNT],
            writes: heapless::Vec::new(),
            core,
            stalled: None,
            debugger: false,
            debugger_breaks: 0,
            traps: 0,
            trap_limit: None,
        }
    }

    /// Attach or detach the simulated JTAG adapter.
    pub fn set_debugger_attached(&mut self, attached: bool) {
        self.debugger = attached;
    }

    /// Preload `DEBUGCAUSE` (or any other register) without logging a write.
    pub fn preload(&mut self, register: SpecialRegister, value: u32) {
        if let Some(slot) = self.registers.get_mut(Self::slot(register)) {
            *slot = value;
        }
    }

    /// Every special-register write, in order.
    pub fn writes(&self) -> &[(SpecialRegister, u32)] {
        &self.writes
    }

    /// Core stalled by the handler, if any.
    pub fn stalled(&self) -> Option<CoreId> {
        self.stalled
    }

    /// Number of `break.n 1` executions.
    pub fn debugger_breaks(&self) -> u32 {
        self.debugger_breaks
    }

    /// Number of `break 0,0` executions.
    pub fn traps(&self) -> u32 {
        self.traps
    }

    /// Panic on the `limit`-th trap, so `abort()`'s trap loop can be
    /// driven from a test.
    pub fn panic_after_traps(&mut self, limit: u32) {
        self.trap_limit = Some(limit);
    }

    fn slot(register: SpecialRegister) -> usize {
        SpecialRegister::ALL
            .iter()
            .position(|r| *r == register)
            .unwrap_or(0)
    }
}

impl CpuControl for MockCpu {
    fn read_special(&self, register: SpecialRegister) -> u32 {
        self.registers
            .get(Self::slot(register))
            .copied()
            .unwrap_or(0)
    }

    fn write_special(&mut self, register: SpecialRegister, value: u32) {
        if let Some(slot) = self.registers.get_mut(Self::slot(register)) {
            *slot = value;
        }
        let _ = self.writes.push((register, value));
    }

    fn core_id(&self) -> CoreId {
        self.core
    }

    fn stall_core(&mut self, core: CoreId) {
        self.stalled = Some(core);
    }

    fn debugger_attached(&self) -> bool {
        self.debugger
    }

    fn debugger_break(&mut self) {
        self.debugger_breaks = self.debugger_breaks.saturating_add(1);
    }

    fn trap(&mut self) {
        self.traps = self.traps.saturating_add(1);
        if self.trap_limit.is_some_and(|limit| self.traps >= limit) {
            panic!("MockCpu trap limit ({} traps)", self.traps);
        }
    }

    fn halt(&mut self) -> ! {
        panic!("MockCpu halted");
    }
}

/// Mock timer-group watchdogs with write-protect enforcement
pub struct MockWatchdog {
    registers: [[u32; 5]; 2],
    unlocked: [bool; 2],
    writes: heapless::Vec<(TimerGroup, WdtRegister, u32), 64>,
    rejected_writes: u32,
    feeds: [u32; 2],
}

impl MockWatchdog {
    /// Both watchdogs enabled (as left by the bootloader), both locked.
    pub fn new() -> Self {
        let mut registers = [[0; 5]; 2];
        for group in &mut registers {
            group[Self::reg(WdtRegister::Config0)] = watchdog::WDT_EN;
        }
        Self {
            registers,
            unlocked: [false; 2],
            writes: heapless::Vec::new(),
            rejected_writes: 0,
            feeds: [0; 2],
        }
    }

    /// Every register write that reached the bus, in order.
    pub fn writes(&self) -> &[(TimerGroup, WdtRegister, u32)] {
        &self.writes
    }

    /// Writes discarded because the group was still write-protected.
    pub fn rejected_writes(&self) -> u32 {
        self.rejected_writes
    }

    /// Whether `group` is currently unlocked.
    pub fn is_unlocked(&self, group: TimerGroup) -> bool {
        self.unlocked[Self::group(group)]
    }

    /// Whether `group`'s watchdog is enabled.
    pub fn is_enabled(&self, group: TimerGroup) -> bool {
        self.read(group, WdtRegister::Config0) & watchdog::WDT_EN != 0
    }

    /// Number of feeds seen on `group`.
    pub fn feeds(&self, group: TimerGroup) -> u32 {
        self.feeds[Self::group(group)]
    }

    fn group(group: TimerGroup) -> usize {
        match group {
            TimerGroup::Tg0 => 0,
            TimerGroup::Tg1 => 1,
        }
    }

    fn reg(register: WdtRegister) -> usize {
        match register {
            WdtRegister::Config0 => 0,
            WdtRegister::Config1 => 1,
            WdtRegister::Config2 => 2,
            WdtRegister::Feed => 3,
            WdtRegister::WriteProtect => 4,
        }
    }
}

impl Default for MockWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchdogRegisters for MockWatchdog {
    fn read(&self, group: TimerGroup, register: WdtRegister) -> u32 {
        self.registers[Self::group(group)][Self::reg(register)]
    }

    fn write(&mut self, group: TimerGroup, register: WdtRegister, value: u32) {
        let g = Self::group(group);
        if register == WdtRegister::WriteProtect {
            self.unlocked[g] = value == watchdog::WDT_WRITE_KEY;
        } else if !self.unlocked[g] {
            self.rejected_writes = self.rejected_writes.saturating_add(1);
            return;
        }
        if register == WdtRegister::Feed {
            self.feeds[g] = self.feeds[g].saturating_add(1);
        }
        self.registers[g][Self::reg(register)] = value;
        let _ = self.writes.push((group, register, value));
    }
}

/// Synthetic stack image for unwinder tests
pub struct MockStack {
    words: heapless::Vec<(u32, u32), 512>,
    reads: RefCell<heapless::Vec<u32, 512>>,
}

impl MockStack {
    /// Empty image: every read misses.
    pub fn new() -> Self {
        Self {
            words: heapless::Vec::new(),
            reads: RefCell::new(heapless::Vec::new()),
        }
    }

    /// Store `value` at `address`, replacing any previous word.
    pub fn poke(&mut self, address: u32, value: u32) {
        if let Some(entry) = self.words.iter_mut().find(|(a, _)| *a == address) {
            entry.1 = value;
        } else {
            let _ = self.words.push((address, value));
        }
    }

    /// Build a windowed-ABI spill area for a frame whose stack pointer is
    /// `sp`: the caller's return address at `sp - 16` and the caller's stack
    /// pointer at `sp - 12`.
    pub fn push_frame(&mut self, sp: u32, return_address: u32, caller_sp: u32) {
        self.poke(sp.wrapping_sub(16), return_address);
        self.poke(sp.wrapping_sub(12), caller_sp);
    }

    /// Every address read so far, in order.
    pub fn reads(&self) -> heapless::Vec<u32, 512> {
        self.reads.borrow().clone()
    }
}

impl Default for MockStack {
    fn default() -> Self {
        Self::new()
    }
}

impl WordReader for MockStack {
    fn read_word(&self, address: u32) -> Option<u32> {
        let _ = self.reads.borrow_mut().push(address);
        self.words
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, v)| *v)
    }
}

/// Mock system control: counts delay time, panics on reset
pub struct MockSystem {
    delayed_ns: u64,
    delay_calls: u32,
}

impl MockSystem {
    /// Create new mock system control
    pub fn new() -> Self {
        Self {
            delayed_ns: 0,
            delay_calls: 0,
        }
    }

    /// Total busy-wait time requested, in nanoseconds.
    pub fn delayed_ns(&self) -> u64 {
        self.delayed_ns
    }

    /// Number of delay calls.
    pub fn delay_calls(&self) -> u32 {
        self.delay_calls
    }
}

impl Default for MockSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayNs for MockSystem {
    fn delay_ns(&mut self, ns: u32) {
        self.delayed_ns = self.delayed_ns.saturating_add(u64::from(ns));
        self.delay_calls = self.delay_calls.saturating_add(1);
    }
}

impl SystemControl for MockSystem {
    fn software_reset(&mut self) -> ! {
        panic!("MockSystem software reset");
    }
}
