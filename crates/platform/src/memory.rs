//! Word-granular memory reads
//!
//! The unwinder reads saved registers out of the spill area below each stack
//! pointer. On hardware this is a volatile load; on the host it is a lookup in
//! a synthetic stack image. Range and alignment policy is enforced by the
//! caller (`fault::backtrace::StackWindow`) before any read is issued.

/// Reads 32-bit words from memory.
pub trait WordReader {
    /// Read the word at `address`, or `None` if the implementation cannot
    /// service it (host images only; hardware always returns `Some`).
    fn read_word(&self, address: u32) -> Option<u32>;
}

impl<R: WordReader + ?Sized> WordReader for &R {
    fn read_word(&self, address: u32) -> Option<u32> {
        (**self).read_word(address)
    }
}
