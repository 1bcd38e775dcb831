//! Exception classifier.
//!
//! Two vocabularies share the frame's `EXCCAUSE` word:
//!
//! - the structured-panic path stores a small [`PanicReason`] code there;
//! - the unhandled-exception path leaves the raw Xtensa `EXCCAUSE` value,
//!   looked up in [`EXCEPTION_NAMES`].
//!
//! Both lookups are total: an out-of-range code maps to a default label and
//! never indexes past a table.
//!
//! For [`PanicReason::DebugException`] the `DEBUGCAUSE` special register says
//! which debug facility fired; see [`DebugCause`].

use bitflags::bitflags;

/// Coarse panic reasons, stored in `EXCCAUSE` by the structured-panic path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum PanicReason {
    /// Anything not listed below.
    Unknown = 0,
    /// A debug exception nobody claimed.
    DebugException = 1,
    /// Exception raised while `PS.EXCM` was set.
    DoubleException = 2,
    /// Kernel-mode exception nobody claimed.
    KernelException = 3,
    /// Coprocessor context error.
    CoprocessorException = 4,
    /// Interrupt watchdog expired on core 0.
    InterruptWdtCpu0 = 5,
    /// Interrupt watchdog expired on core 1.
    InterruptWdtCpu1 = 6,
}

/// Panic reason labels, indexed by code.
pub const PANIC_REASONS: [&str; 7] = [
    "Unknown reason",
    "Unhandled debug exception",
    "Double exception",
    "Unhandled kernel exception",
    "Coprocessor exception",
    "Interrupt wdt timeout on CPU0",
    "Interrupt wdt timeout on CPU1",
];

impl PanicReason {
    /// Highest valid panic reason code.
    pub const MAX: u32 = 6;

    /// Decode a reason code. Codes above [`Self::MAX`] are `Unknown`.
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::DebugException,
            2 => Self::DoubleException,
            3 => Self::KernelException,
            4 => Self::CoprocessorException,
            5 => Self::InterruptWdtCpu0,
            6 => Self::InterruptWdtCpu1,
            _ => Self::Unknown,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        panic_reason_label(self as u32)
    }
}

/// Label for a panic reason code; out-of-range codes get `"Unknown reason"`.
pub fn panic_reason_label(code: u32) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|i| PANIC_REASONS.get(i))
        .or(PANIC_REASONS.first())
        .copied()
        .unwrap_or("Unknown reason")
}

/// Xtensa general exception causes, indexed by `EXCCAUSE`. `res` marks codes
/// the architecture reserves.
pub const EXCEPTION_NAMES: [&str; 40] = [
    "IllegalInstruction", "Syscall", "InstructionFetchError", "LoadStoreError",
    "Level1Interrupt", "Alloca", "IntegerDivideByZero", "PCValue",
    "Privileged", "LoadStoreAlignment", "res", "res",
    "InstrPDAddrError", "LoadStorePIFDataError", "InstrPIFAddrError", "LoadStorePIFAddrError",
    "InstTLBMiss", "InstTLBMultiHit", "InstFetchPrivilege", "res",
    "InstrFetchProhibited", "res", "res", "res",
    "LoadStoreTLBMiss", "LoadStoreTLBMultihit", "LoadStorePrivilege", "res",
    "LoadProhibited", "StoreProhibited", "res", "res",
    "Cp0Dis", "Cp1Dis", "Cp2Dis", "Cp3Dis",
    "Cp4Dis", "Cp5Dis", "Cp6Dis", "Cp7Dis",
];

/// Label printed for `EXCCAUSE` values past the end of [`EXCEPTION_NAMES`].
pub const UNKNOWN_EXCEPTION: &str = "Unknown";

/// Label carried by reserved `EXCCAUSE` slots.
pub const RESERVED_EXCEPTION: &str = "res";

/// Raw `EXCCAUSE` value from the unhandled-exception path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExceptionCause(pub u32);

impl ExceptionCause {
    /// Illegal instruction.
    pub const ILLEGAL_INSTRUCTION: Self = Self(0);
    /// Integer divide by zero.
    pub const INTEGER_DIVIDE_BY_ZERO: Self = Self(6);
    /// Unaligned load or store.
    pub const LOAD_STORE_ALIGNMENT: Self = Self(9);
    /// Cache attribute does not allow instruction fetch.
    pub const INSTR_FETCH_PROHIBITED: Self = Self(20);
    /// Cache attribute does not allow load.
    pub const LOAD_PROHIBITED: Self = Self(28);
    /// Cache attribute does not allow store.
    pub const STORE_PROHIBITED: Self = Self(29);

    /// Human-readable name; `"Unknown"` past the table, `"res"` for
    /// reserved codes.
    pub fn name(self) -> &'static str {
        usize::try_from(self.0)
            .ok()
            .and_then(|i| EXCEPTION_NAMES.get(i))
            .copied()
            .unwrap_or(UNKNOWN_EXCEPTION)
    }

    /// Whether the architecture reserves this code.
    pub fn is_reserved(self) -> bool {
        self.name() == RESERVED_EXCEPTION
    }
}

bitflags! {
    /// `DEBUGCAUSE` special register. Bits are independent; several may be
    /// set at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DebugCause: u32 {
        /// ICOUNT reached zero (single step).
        const ICOUNT = 1 << 0;
        /// Instruction breakpoint matched.
        const IBREAK = 1 << 1;
        /// Data watchpoint matched.
        const DBREAK = 1 << 2;
        /// `break` instruction.
        const BREAK = 1 << 3;
        /// `break.n` instruction.
        const BREAKN = 1 << 4;
        /// Debug interrupt injected by the OCD.
        const DEBUGINT = 1 << 5;
        /// Low bit of DBNUM: set when watchpoint 1 (not 0) fired.
        ///
        /// The LX6 sets this even though the ISA only defines DBNUM for
        /// configurations with more debug registers.
        const DBNUM_1 = 1 << 8;
    }
}

impl DebugCause {
    /// Decode the raw register, ignoring bits we do not interpret.
    pub const fn from_register(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// Label for every set cause, in fixed order.
    ///
    /// With `stack_canary` set, watchpoint 1 is the end-of-stack canary placed
    /// by the scheduler and is reported as such.
    pub fn tokens(self, stack_canary: bool) -> impl Iterator<Item = &'static str> {
        let watchpoint = if !self.contains(Self::DBREAK) {
            None
        } else if !self.contains(Self::DBNUM_1) {
            Some("Watchpoint 0 triggered")
        } else if stack_canary {
            Some("Stack canary watchpoint triggered")
        } else {
            Some("Watchpoint 1 triggered")
        };
        [
            self.contains(Self::ICOUNT).then_some("SingleStep"),
            self.contains(Self::IBREAK).then_some("HwBreakpoint"),
            watchpoint,
            self.contains(Self::BREAK).then_some("BREAK instr"),
            self.contains(Self::BREAKN).then_some("BREAKN instr"),
            self.contains(Self::DEBUGINT).then_some("DebugIntr"),
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_reason_lookup() {
        assert_eq!(panic_reason_label(0), "Unknown reason");
        assert_eq!(panic_reason_label(2), "Double exception");
        assert_eq!(panic_reason_label(6), "Interrupt wdt timeout on CPU1");
    }

    #[test]
    fn test_panic_reason_past_max_is_unknown() {
        assert_eq!(panic_reason_label(PanicReason::MAX + 1), "Unknown reason");
        assert_eq!(panic_reason_label(u32::MAX), "Unknown reason");
        assert_eq!(PanicReason::from_code(7), PanicReason::Unknown);
        assert_eq!(PanicReason::from_code(1), PanicReason::DebugException);
    }

    #[test]
    fn test_reason_enum_agrees_with_table() {
        for code in 0..=PanicReason::MAX {
            assert_eq!(PanicReason::from_code(code).label(), panic_reason_label(code));
        }
    }

    #[test]
    fn test_exception_names() {
        assert_eq!(ExceptionCause::LOAD_PROHIBITED.name(), "LoadProhibited");
        assert_eq!(ExceptionCause::STORE_PROHIBITED.name(), "StoreProhibited");
        assert_eq!(ExceptionCause(0).name(), "IllegalInstruction");
        assert_eq!(ExceptionCause(39).name(), "Cp7Dis");
        assert_eq!(ExceptionCause(40).name(), "Unknown");
        assert_eq!(ExceptionCause(200).name(), "Unknown");
    }

    #[test]
    fn test_reserved_exception_codes() {
        let reserved: heapless::Vec<u32, 16> =
            (0..40).filter(|c| ExceptionCause(*c).is_reserved()).collect();
        assert_eq!(&reserved[..], &[10, 11, 19, 21, 22, 23, 27, 30, 31]);
    }

    #[test]
    fn test_debug_cause_tokens_in_fixed_order() {
        let cause = DebugCause::DEBUGINT | DebugCause::ICOUNT | DebugCause::BREAK;
        let tokens: heapless::Vec<&str, 8> = cause.tokens(false).collect();
        assert_eq!(&tokens[..], &["SingleStep", "BREAK instr", "DebugIntr"]);
    }

    #[test]
    fn test_watchpoint_slot_disambiguation() {
        let wp0 = DebugCause::from_register(0x4);
        let wp1 = DebugCause::from_register(0x104);
        assert_eq!(wp0.tokens(true).next(), Some("Watchpoint 0 triggered"));
        assert_eq!(wp1.tokens(false).next(), Some("Watchpoint 1 triggered"));
        assert_eq!(wp1.tokens(true).next(), Some("Stack canary watchpoint triggered"));
    }

    #[test]
    fn test_dbnum_without_dbreak_is_ignored() {
        assert_eq!(DebugCause::from_register(0x100).tokens(true).count(), 0);
    }

    #[test]
    fn test_all_debug_causes() {
        let tokens: heapless::Vec<&str, 8> = DebugCause::from_register(0x3F).tokens(false).collect();
        assert_eq!(
            &tokens[..],
            &[
                "SingleStep",
                "HwBreakpoint",
                "Watchpoint 0 triggered",
                "BREAK instr",
                "BREAKN instr",
                "DebugIntr",
            ]
        );
    }
}
