//! Captured register frame.
//!
//! Layout matches the frame the Xtensa trap entry stub stores on the faulting
//! task's stack, so the C-ABI entry points can hand a `*mut ExceptionFrame`
//! straight through.
//!
//! | Word | Field      |
//! |------|------------|
//! | 0    | `exit`     |
//! | 1    | `PC`       |
//! | 2    | `PS`       |
//! | 3–18 | `A0`–`A15` |
//! | 19   | `SAR`      |
//! | 20   | `EXCCAUSE` |
//! | 21   | `EXCVADDR` |
//! | 22   | `LBEG`     |
//! | 23   | `LEND`     |
//! | 24   | `LCOUNT`   |

/// Number of 32-bit words in an [`ExceptionFrame`].
pub const FRAME_WORDS: usize = 25;

/// Register snapshot taken by the trap entry stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct ExceptionFrame {
    /// Exit dispatcher address (not a register).
    pub exit: u32,
    /// Program counter at the fault.
    pub pc: u32,
    /// Processor state.
    pub ps: u32,
    /// General registers A0–A15 of the current window.
    pub a: [u32; 16],
    /// Shift-amount register.
    pub sar: u32,
    /// Exception cause code (or panic reason for the structured path).
    pub exccause: u32,
    /// Faulting virtual address.
    pub excvaddr: u32,
    /// Zero-overhead loop begin.
    pub lbeg: u32,
    /// Zero-overhead loop end.
    pub lend: u32,
    /// Zero-overhead loop count.
    pub lcount: u32,
}

impl ExceptionFrame {
    /// A zeroed frame with the given pc, stack pointer, return address and
    /// cause code.
    pub const fn new(pc: u32, sp: u32, return_address: u32, exccause: u32) -> Self {
        let mut a = [0; 16];
        a[0] = return_address;
        a[1] = sp;
        Self {
            exit: 0,
            pc,
            ps: 0,
            a,
            sar: 0,
            exccause,
            excvaddr: 0,
            lbeg: 0,
            lend: 0,
            lcount: 0,
        }
    }

    /// Return address of the faulting function (`A0`).
    pub const fn return_address(&self) -> u32 {
        self.a[0]
    }

    /// Stack pointer of the faulting function (`A1`).
    pub const fn stack_pointer(&self) -> u32 {
        self.a[1]
    }

    /// The frame as its raw word sequence.
    pub fn words(&self) -> [u32; FRAME_WORDS] {
        let mut out = [0; FRAME_WORDS];
        let head = [self.exit, self.pc, self.ps];
        let tail = [
            self.sar,
            self.exccause,
            self.excvaddr,
            self.lbeg,
            self.lend,
            self.lcount,
        ];
        for (slot, value) in out
            .iter_mut()
            .zip(head.iter().chain(self.a.iter()).chain(tail.iter()))
        {
            *slot = *value;
        }
        out
    }

    /// Word `index` of the frame, if it exists.
    pub fn word(&self, index: usize) -> Option<u32> {
        self.words().get(index).copied()
    }
}
