//! Fault handler configuration.
//!
//! Resolved once, at build time, into a single `const` [`FaultConfig`]. The
//! common handler matches on [`RecoveryAction`] exactly once.

use crate::backtrace::UnwindConfig;
use crate::console::DiagnosticOutput;

/// What the common handler does after the diagnostics are out.
///
/// Exactly one is active per build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecoveryAction {
    /// Disable the watchdogs and hand the frame to the GDB stub.
    DebugStub,
    /// Print everything, wait for the FIFO to drain, reset.
    PrintAndReboot,
    /// Reset without printing anything.
    SilentReboot,
    /// Write a core dump to flash.
    PersistToStorage {
        /// Reset afterwards instead of halting.
        then_reboot: bool,
    },
    /// Stream a core dump over the diagnostic UART.
    PersistToStream {
        /// Reset afterwards instead of halting.
        then_reboot: bool,
    },
    /// Disable the watchdogs and spin forever.
    Halt,
}

impl RecoveryAction {
    /// Whether this action ends in a software reset.
    pub const fn reboots(self) -> bool {
        match self {
            Self::PrintAndReboot | Self::SilentReboot => true,
            Self::PersistToStorage { then_reboot } | Self::PersistToStream { then_reboot } => {
                then_reboot
            }
            Self::DebugStub | Self::Halt => false,
        }
    }

    /// Short name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DebugStub => "debug-stub",
            Self::PrintAndReboot => "print-reboot",
            Self::SilentReboot => "silent-reboot",
            Self::PersistToStorage { .. } => "coredump-flash",
            Self::PersistToStream { .. } => "coredump-uart",
            Self::Halt => "halt",
        }
    }
}

/// Complete fault handler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultConfig {
    /// Diagnostic channel on or off.
    pub diagnostics: DiagnosticOutput,
    /// Terminal action.
    pub recovery: RecoveryAction,
    /// Watchpoint 1 guards the end of each task stack.
    pub stack_canary_watchpoint: bool,
    /// Unwinder bounds.
    pub unwind: UnwindConfig,
}

impl FaultConfig {
    /// Print-and-reboot with diagnostics on, no canary watchpoint.
    pub const DEFAULT: Self = Self {
        diagnostics: DiagnosticOutput::Enabled,
        recovery: RecoveryAction::PrintAndReboot,
        stack_canary_watchpoint: false,
        unwind: UnwindConfig::ESP32,
    };

    /// Default configuration with a different recovery action.
    pub const fn with_recovery(recovery: RecoveryAction) -> Self {
        Self {
            recovery,
            ..Self::DEFAULT
        }
    }

    /// Diagnostic output actually in effect. Silent reboot overrides the
    /// configured channel.
    pub const fn effective_diagnostics(&self) -> DiagnosticOutput {
        match self.recovery {
            RecoveryAction::SilentReboot => DiagnosticOutput::Silent,
            _ => self.diagnostics,
        }
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
