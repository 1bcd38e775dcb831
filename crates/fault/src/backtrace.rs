//! Stack unwinder for the Xtensa windowed ABI.
//!
//! With the windowed calling convention every frame spills its caller's `A0`
//! (return address) and `A1` (stack pointer) into the 16-byte base save area
//! just below its own stack pointer:
//!
//! ```text
//!   sp - 16 : caller return address (A0)
//!   sp - 12 : caller stack pointer  (A1)
//!   sp -  8 : A2
//!   sp -  4 : A3
//!   sp      : <frame body>
//! ```
//!
//! A return address has the window increment in its top two bits (`0b10` for
//! `call8`), so an MSB-set value is remapped into the `0x4000_0000` code
//! window before printing.
//!
//! The walk is a heuristic. It never reads outside the base save area of a
//! stack pointer that passed [`StackWindow::is_sane`], stops at the first
//! return address below the code base, and gives up after
//! [`UnwindConfig::max_depth`] entries whatever the stack contains.

use platform::{TxFifo, WordReader};

use crate::console::Console;
use crate::frame::ExceptionFrame;

/// Offset of the caller's return address below a frame's stack pointer.
pub const RETURN_ADDRESS_OFFSET: u32 = 0x10;

/// Offset of the caller's stack pointer below a frame's stack pointer.
pub const CALLER_SP_OFFSET: u32 = 0x10 - 4;

/// Stack and code windows the unwinder trusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnwindConfig {
    /// Lowest plausible stack pointer (inclusive).
    pub stack_low: u32,
    /// Highest plausible stack pointer (inclusive).
    pub stack_high: u32,
    /// Required stack pointer alignment in bytes (power of two).
    pub stack_alignment: u32,
    /// Lowest executable address; return addresses below it end the walk.
    pub code_base: u32,
    /// Hard cap on emitted entries.
    pub max_depth: usize,
}

impl UnwindConfig {
    /// ESP32 internal DRAM task stacks, IRAM/flash code.
    pub const ESP32: Self = Self {
        stack_low: 0x3FFA_E010,
        stack_high: 0x3FFF_FFF0,
        stack_alignment: 16,
        code_base: 0x4000_0000,
        max_depth: 100,
    };
}

impl Default for UnwindConfig {
    fn default() -> Self {
        Self::ESP32
    }
}

/// Why a stack read was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnwindError {
    /// Address outside the configured stack window.
    OutOfBounds,
    /// Address not word aligned.
    Misaligned,
    /// The memory behind the address could not be read.
    Unreadable,
}

impl core::fmt::Display for UnwindError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "address outside stack window"),
            Self::Misaligned => write!(f, "address not word aligned"),
            Self::Unreadable => write!(f, "memory unreadable"),
        }
    }
}

/// Bounds-checked view of stack memory.
pub struct StackWindow<M> {
    memory: M,
    config: UnwindConfig,
}

impl<M: WordReader> StackWindow<M> {
    /// Wrap a word reader with the given bounds.
    pub fn new(memory: M, config: UnwindConfig) -> Self {
        Self { memory, config }
    }

    /// Bounds in force.
    pub fn config(&self) -> &UnwindConfig {
        &self.config
    }

    /// Whether `sp` can be a live stack pointer: inside the window and
    /// aligned.
    pub fn is_sane(&self, sp: u32) -> bool {
        let align_mask = self.config.stack_alignment.wrapping_sub(1);
        sp >= self.config.stack_low && sp <= self.config.stack_high && sp & align_mask == 0
    }

    /// Read the word at `address`.
    ///
    /// The address must lie in the base save area of some sane stack pointer,
    /// i.e. within 16 bytes below the window.
    ///
    /// # Errors
    ///
    /// [`UnwindError::OutOfBounds`], [`UnwindError::Misaligned`] or
    /// [`UnwindError::Unreadable`]; the caller stops unwinding.
    pub fn read(&self, address: u32) -> Result<u32, UnwindError> {
        let low = self.config.stack_low.saturating_sub(RETURN_ADDRESS_OFFSET);
        if address < low || address > self.config.stack_high {
            return Err(UnwindError::OutOfBounds);
        }
        if address & 0x3 != 0 {
            return Err(UnwindError::Misaligned);
        }
        self.memory.read_word(address).ok_or(UnwindError::Unreadable)
    }
}

/// One backtrace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CallChainEntry {
    /// Code address, already mapped into the code window.
    pub pc: u32,
    /// Stack pointer of the frame.
    pub sp: u32,
}

impl CallChainEntry {
    /// Build an entry, normalising a windowed return address.
    pub fn new(pc: u32, sp: u32) -> Self {
        Self {
            pc: normalize_pc(pc),
            sp,
        }
    }
}

/// Map a windowed-ABI return address into the `0x4000_0000` code window.
///
/// The top two bits of a return address hold the caller's window increment.
/// An MSB-set address is a return address, not a literal code address.
pub const fn normalize_pc(pc: u32) -> u32 {
    if pc & 0x8000_0000 != 0 {
        (pc & 0x3FFF_FFFF) | 0x4000_0000
    } else {
        pc
    }
}

/// Lazy, single-pass walk of the call chain.
///
/// The first entry (the faulting pc and sp) is emitted before any validation;
/// a smashed top frame is still worth printing.
pub struct Backtrace<'a, M> {
    stack: &'a StackWindow<M>,
    pc: u32,
    sp: u32,
    next_pc: u32,
    emitted: usize,
    done: bool,
}

impl<'a, M: WordReader> Backtrace<'a, M> {
    /// Start unwinding from `frame`.
    pub fn new(stack: &'a StackWindow<M>, frame: &ExceptionFrame) -> Self {
        Self {
            stack,
            pc: frame.pc,
            sp: frame.stack_pointer(),
            next_pc: frame.return_address(),
            emitted: 0,
            done: false,
        }
    }

    fn finish(&mut self) -> Option<CallChainEntry> {
        self.done = true;
        None
    }
}

impl<M: WordReader> Iterator for Backtrace<'_, M> {
    type Item = CallChainEntry;

    fn next(&mut self) -> Option<CallChainEntry> {
        if self.done || self.emitted >= self.stack.config().max_depth {
            return self.finish();
        }
        if self.emitted == 0 {
            self.emitted = 1;
            let entry = CallChainEntry::new(self.pc, self.sp);
            self.pc = self.next_pc;
            return Some(entry);
        }
        if !self.stack.is_sane(self.sp) {
            return self.finish();
        }

        let frame_sp = self.sp;
        let Ok(caller_sp) = self.stack.read(frame_sp.wrapping_sub(CALLER_SP_OFFSET)) else {
            return self.finish();
        };
        let entry = CallChainEntry::new(self.pc, caller_sp);
        self.emitted = self.emitted.saturating_add(1);
        self.sp = caller_sp;

        match self.stack.read(frame_sp.wrapping_sub(RETURN_ADDRESS_OFFSET)) {
            Ok(caller_pc) if caller_pc >= self.stack.config().code_base => self.pc = caller_pc,
            // Below the code base: walked past the outermost real frame.
            _ => self.done = true,
        }
        Some(entry)
    }
}

/// Print `\r\nBacktrace: 0x<pc>:0x<sp> ...\r\n\r\n`.
pub fn print_backtrace<T: TxFifo, M: WordReader>(
    console: &mut Console<T>,
    stack: &StackWindow<M>,
    frame: &ExceptionFrame,
) {
    console.put_str("\r\nBacktrace:");
    for entry in Backtrace::new(stack, frame) {
        console.put_str(" 0x");
        console.put_hex(entry.pc);
        console.put_str(":0x");
        console.put_hex(entry.sp);
    }
    console.put_str("\r\n\r\n");
}
