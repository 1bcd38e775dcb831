//! Raw diagnostic channel.
//!
//! Polling, unbuffered output straight into the UART0 TX FIFO. Usable when
//! every higher-level I/O path (drivers, locks, the heap, interrupts) is
//! suspect. Nothing here allocates, blocks on an interrupt or reports an
//! error: a dead UART just loses bytes.
//!
//! When diagnostics are configured off every operation is a no-op with the
//! same signature, so the fault path never branches on configuration.

use platform::TxFifo;

/// The channel waits while the TX FIFO holds at least this many bytes.
///
/// The ESP32 UART FIFO is 128 bytes deep.
pub const TX_FIFO_HIGH_WATER: u8 = 126;

/// Whether the diagnostic channel emits anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticOutput {
    /// Write to UART0.
    Enabled,
    /// Drop everything.
    Silent,
}

/// Raw diagnostic channel over a [`TxFifo`].
pub struct Console<T> {
    tx: T,
    output: DiagnosticOutput,
}

impl<T: TxFifo> Console<T> {
    /// Wrap a transmit FIFO.
    pub fn new(tx: T, output: DiagnosticOutput) -> Self {
        Self { tx, output }
    }

    /// Whether bytes reach the FIFO.
    pub fn is_enabled(&self) -> bool {
        self.output == DiagnosticOutput::Enabled
    }

    /// Borrow the underlying FIFO.
    pub fn inner(&self) -> &T {
        &self.tx
    }

    /// Release the underlying FIFO.
    pub fn into_inner(self) -> T {
        self.tx
    }

    /// Write one byte, busy-polling until the FIFO has room.
    pub fn put_char(&mut self, c: u8) {
        if !self.is_enabled() {
            return;
        }
        while self.tx.tx_fifo_count() >= TX_FIFO_HIGH_WATER {}
        self.tx.write_fifo(c);
    }

    /// Write a string byte by byte.
    pub fn put_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.put_char(b);
        }
    }

    /// Write `value` as exactly eight lowercase hex digits.
    pub fn put_hex(&mut self, value: u32) {
        for shift in (0..8u32).rev() {
            let nibble = (value >> shift.wrapping_mul(4)) & 0xF;
            self.put_char(hex_digit(nibble));
        }
    }

    /// Write `value` as two decimal columns, space-padded on the left.
    ///
    /// Only meaningful for 0..=99 (core ids, register indices). Larger values
    /// print their last two digits.
    pub fn put_dec(&mut self, value: u32) {
        let tens = (value / 10) % 10;
        let ones = value % 10;
        if tens == 0 {
            self.put_char(b' ');
        } else {
            self.put_char(decimal_digit(tens));
        }
        self.put_char(decimal_digit(ones));
    }
}

#[allow(clippy::cast_possible_truncation)] // nibble < 16
fn hex_digit(nibble: u32) -> u8 {
    let n = (nibble & 0xF) as u8;
    if n < 10 {
        b'0'.wrapping_add(n)
    } else {
        b'a'.wrapping_add(n.wrapping_sub(10))
    }
}

#[allow(clippy::cast_possible_truncation)] // digit < 10
fn decimal_digit(digit: u32) -> u8 {
    b'0'.wrapping_add((digit % 10) as u8)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::MockUart;

    fn console() -> Console<MockUart> {
        Console::new(MockUart::new(), DiagnosticOutput::Enabled)
    }

    #[test]
    fn test_put_hex_is_eight_lowercase_digits() {
        let mut c = console();
        c.put_hex(0xDEAD_BEEF);
        c.put_char(b' ');
        c.put_hex(0x1);
        assert_eq!(c.inner().output(), "deadbeef 00000001");
    }

    #[test]
    fn test_put_dec_pads_single_digit() {
        let mut c = console();
        c.put_dec(0);
        c.put_dec(7);
        c.put_dec(42);
        assert_eq!(c.inner().output(), " 0 742");
    }

    #[test]
    fn test_silent_console_writes_nothing() {
        let mut c = Console::new(MockUart::new(), DiagnosticOutput::Silent);
        c.put_str("Guru Meditation");
        c.put_hex(0x1234);
        c.put_dec(1);
        assert_eq!(c.inner().bytes().len(), 0);
        assert_eq!(c.inner().polls(), 0);
    }

    #[test]
    fn test_put_char_waits_for_fifo_room() {
        let mut uart = MockUart::new();
        uart.stall_for(5);
        let mut c = Console::new(uart, DiagnosticOutput::Enabled);
        c.put_char(b'!');
        assert_eq!(c.inner().output(), "!");
        assert_eq!(c.inner().polls(), 6);
    }
}
