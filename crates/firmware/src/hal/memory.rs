//! Volatile word reads for the unwinder.

use platform::WordReader;

/// Raw memory. Only ever handed addresses that `fault::StackWindow` has
/// already checked against the DRAM stack window.
pub struct VolatileMemory;

impl WordReader for VolatileMemory {
    fn read_word(&self, address: u32) -> Option<u32> {
        // SAFETY: the caller restricts `address` to word-aligned internal
        // DRAM, which is always mapped and readable.
        Some(unsafe { core::ptr::read_volatile(address as *const u32) })
    }
}
