//! Abort flag, resume latch and the `abort()` primitive.
//!
//! The abort flag is the only state shared between normal execution and the
//! fault handler. It goes `false → true` once and is never cleared; the trap
//! that follows provides the ordering, so relaxed atomics are enough.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use platform::{CpuControl, TxFifo};

use crate::backtrace::normalize_pc;
use crate::console::Console;

/// Width of a `call` instruction; subtracted from a return address to point
/// at the call site.
pub const CALL_INSTRUCTION_WIDTH: u32 = 3;

/// Set-once "abort() was called" flag.
#[derive(Debug, Default)]
pub struct AbortFlag(AtomicBool);

impl AbortFlag {
    /// A flag that has not been raised.
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Raise the flag. Idempotent.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether `abort()` has run.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

const LATCH_DISARMED: u32 = 0;

/// Remembers the pc of the last "set breakpoint and return" decision.
///
/// If the same pc faults again while armed, no debugger consumed the
/// breakpoint and the unhandled-exception path must stop returning.
#[derive(Debug, Default)]
pub struct ResumeLatch(AtomicU32);

impl ResumeLatch {
    /// A disarmed latch.
    pub const fn new() -> Self {
        Self(AtomicU32::new(LATCH_DISARMED))
    }

    /// Arm for `pc`.
    pub fn arm(&self, pc: u32) {
        self.0.store(pc, Ordering::Relaxed);
    }

    /// Whether the latch is armed for exactly `pc`.
    pub fn is_armed_for(&self, pc: u32) -> bool {
        pc != LATCH_DISARMED && self.0.load(Ordering::Relaxed) == pc
    }

    /// Disarm.
    pub fn disarm(&self) {
        self.0.store(LATCH_DISARMED, Ordering::Relaxed);
    }
}

/// Process-wide state the fault handler reads. One `static` on target.
#[derive(Debug, Default)]
pub struct FaultState {
    /// Set by `abort()`.
    pub abort: AbortFlag,
    /// Armed by the unhandled-exception path.
    pub resume: ResumeLatch,
}

impl FaultState {
    /// Fresh state.
    pub const fn new() -> Self {
        Self {
            abort: AbortFlag::new(),
            resume: ResumeLatch::new(),
        }
    }
}

/// Print the abort banner and raise the flag. Everything `abort()` does
/// before it starts trapping.
///
/// `return_address` is the raw `A0`; its window-increment bits are mapped
/// back into the code window before the call width is subtracted.
pub fn record_abort<T: TxFifo>(console: &mut Console<T>, state: &FaultState, return_address: u32) {
    console.put_str("abort() was called at PC 0x");
    console.put_hex(normalize_pc(return_address).wrapping_sub(CALL_INSTRUCTION_WIDTH));
    console.put_str("\r\n");
    state.abort.raise();
}

/// Abort: record, then execute the trap instruction forever so the fault
/// vector (or an attached debugger) takes over with the flag set.
pub fn abort<T: TxFifo, C: CpuControl>(
    console: &mut Console<T>,
    cpu: &mut C,
    state: &FaultState,
    return_address: u32,
) -> ! {
    record_abort(console, state, return_address);
    loop {
        cpu.trap();
    }
}
