//! Chip-level control: busy-wait delay and software reset

use embedded_hal::delay::DelayNs;

/// Whole-chip operations used by the reboot recovery path.
///
/// The delay comes from [`DelayNs`] and must be a pure busy-wait: interrupts
/// and the scheduler are off while the fault handler runs.
pub trait SystemControl: DelayNs {
    /// Reset the whole chip. Never returns.
    fn software_reset(&mut self) -> !;
}
