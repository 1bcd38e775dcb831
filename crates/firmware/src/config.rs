//! Cargo feature → [`FaultConfig`] resolution.
//!
//! | Features                                   | Result                                   |
//! |--------------------------------------------|------------------------------------------|
//! | (none)                                     | `PrintAndReboot`                         |
//! | `recovery-print-reboot`                    | `PrintAndReboot`                         |
//! | `recovery-silent-reboot`                   | `SilentReboot`                           |
//! | `recovery-debug-stub`                      | `DebugStub`                              |
//! | `recovery-halt`                            | `Halt`                                   |
//! | `recovery-coredump-flash`                  | `PersistToStorage { then_reboot: false }`|
//! | `recovery-coredump-flash` + either reboot  | `PersistToStorage { then_reboot: true }` |
//! | `recovery-coredump-uart`                   | `PersistToStream { then_reboot: false }` |
//! | `recovery-coredump-uart` + print-reboot    | `PersistToStream { then_reboot: true }`  |
//!
//! Silent reboot combined with a flash core dump keeps the dump and turns the
//! diagnostic channel off. Every other combination is a build error.

use fault::{DiagnosticOutput, FaultConfig, RecoveryAction, UnwindConfig};

#[cfg(all(
    feature = "recovery-debug-stub",
    any(
        feature = "recovery-print-reboot",
        feature = "recovery-silent-reboot",
        feature = "recovery-coredump-flash",
        feature = "recovery-coredump-uart",
        feature = "recovery-halt",
    )
))]
compile_error!("`recovery-debug-stub` cannot be combined with any other recovery-* feature");

#[cfg(all(
    feature = "recovery-halt",
    any(
        feature = "recovery-print-reboot",
        feature = "recovery-silent-reboot",
        feature = "recovery-coredump-flash",
        feature = "recovery-coredump-uart",
    )
))]
compile_error!("`recovery-halt` cannot be combined with any other recovery-* feature");

#[cfg(all(feature = "recovery-print-reboot", feature = "recovery-silent-reboot"))]
compile_error!("select one of `recovery-print-reboot` and `recovery-silent-reboot`");

#[cfg(all(feature = "recovery-coredump-flash", feature = "recovery-coredump-uart"))]
compile_error!("select one of `recovery-coredump-flash` and `recovery-coredump-uart`");

#[cfg(all(feature = "recovery-silent-reboot", feature = "recovery-coredump-uart"))]
compile_error!("`recovery-coredump-uart` needs the diagnostic UART; it cannot be silent");

/// Recovery-related Cargo features, as plain booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureSelection {
    /// `recovery-debug-stub`
    pub debug_stub: bool,
    /// `recovery-print-reboot`
    pub print_reboot: bool,
    /// `recovery-silent-reboot`
    pub silent_reboot: bool,
    /// `recovery-coredump-flash`
    pub coredump_flash: bool,
    /// `recovery-coredump-uart`
    pub coredump_uart: bool,
    /// `recovery-halt`
    pub halt: bool,
    /// `diagnostics-off`
    pub diagnostics_off: bool,
    /// `stack-canary-watchpoint`
    pub stack_canary_watchpoint: bool,
}

impl FeatureSelection {
    /// Features this crate was built with.
    pub const BUILT: Self = Self {
        debug_stub: cfg!(feature = "recovery-debug-stub"),
        print_reboot: cfg!(feature = "recovery-print-reboot"),
        silent_reboot: cfg!(feature = "recovery-silent-reboot"),
        coredump_flash: cfg!(feature = "recovery-coredump-flash"),
        coredump_uart: cfg!(feature = "recovery-coredump-uart"),
        halt: cfg!(feature = "recovery-halt"),
        diagnostics_off: cfg!(feature = "diagnostics-off"),
        stack_canary_watchpoint: cfg!(feature = "stack-canary-watchpoint"),
    };

    /// Recovery action for this selection. Assumes the combination passed
    /// the build-time conflict checks.
    pub const fn recovery(&self) -> RecoveryAction {
        let reboot = self.print_reboot || self.silent_reboot;
        if self.debug_stub {
            RecoveryAction::DebugStub
        } else if self.halt {
            RecoveryAction::Halt
        } else if self.coredump_flash {
            RecoveryAction::PersistToStorage { then_reboot: reboot }
        } else if self.coredump_uart {
            RecoveryAction::PersistToStream { then_reboot: reboot }
        } else if self.silent_reboot {
            RecoveryAction::SilentReboot
        } else {
            RecoveryAction::PrintAndReboot
        }
    }

    /// Diagnostic channel for this selection.
    pub const fn diagnostics(&self) -> DiagnosticOutput {
        if self.diagnostics_off || self.silent_reboot {
            DiagnosticOutput::Silent
        } else {
            DiagnosticOutput::Enabled
        }
    }

    /// Full configuration for this selection.
    pub const fn resolve(&self) -> FaultConfig {
        FaultConfig {
            diagnostics: self.diagnostics(),
            recovery: self.recovery(),
            stack_canary_watchpoint: self.stack_canary_watchpoint,
            unwind: UnwindConfig::ESP32,
        }
    }
}

/// Fault handler configuration for this build.
pub const FAULT_CONFIG: FaultConfig = FeatureSelection::BUILT.resolve();
