//! `critical-section` implementation for the Xtensa core running the
//! caller: raise `PS.INTLEVEL` to 15 and restore the saved `PS` on release.
//!
//! This masks interrupts on the calling core only. The stack-overflow hook
//! slot is the one user; install the hook before the APP_CPU starts.

use core::arch::asm;

struct XtensaCriticalSection;

critical_section::set_impl!(XtensaCriticalSection);

// SAFETY: `acquire` returns the previous PS and `release` restores exactly
// that value, so nesting is balanced.
unsafe impl critical_section::Impl for XtensaCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let ps: u32;
        // SAFETY: raising the interrupt level is always permitted in
        // kernel mode; the old PS is returned for `release`.
        unsafe { asm!("rsil {0}, 15", out(reg) ps, options(nostack)) };
        ps
    }

    unsafe fn release(ps: critical_section::RawRestoreState) {
        // SAFETY: `ps` came from the matching `acquire`.
        unsafe { asm!("wsr.ps {0}", "rsync", in(reg) ps, options(nostack)) };
    }
}
