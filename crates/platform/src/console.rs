//! UART transmit FIFO abstraction
//!
//! The fault handler cannot trust the UART driver (it may hold a lock, own a
//! DMA channel, or be the thing that faulted). It talks to the FIFO directly:
//! poll the fill level, push one byte.

/// UART0 FIFO register (data port).
pub const UART0_FIFO_REG: u32 = 0x3FF4_0000;

/// UART0 status register. TX FIFO fill level lives in bits \[23:16\].
pub const UART0_STATUS_REG: u32 = 0x3FF4_001C;

/// Shift of the `TXFIFO_CNT` field in [`UART0_STATUS_REG`].
pub const UART_TXFIFO_CNT_SHIFT: u32 = 16;

/// Mask of the `TXFIFO_CNT` field (after shifting).
pub const UART_TXFIFO_CNT_MASK: u32 = 0xFF;

/// Byte-level transmit FIFO.
///
/// Implementations must never block, allocate or fail. If the FIFO is
/// unusable the byte is lost.
pub trait TxFifo {
    /// Number of bytes currently queued in the TX FIFO.
    fn tx_fifo_count(&self) -> u8;

    /// Push one byte into the TX FIFO without checking for space.
    fn write_fifo(&mut self, byte: u8);
}

impl<T: TxFifo + ?Sized> TxFifo for &mut T {
    fn tx_fifo_count(&self) -> u8 {
        (**self).tx_fifo_count()
    }

    fn write_fifo(&mut self, byte: u8) {
        (**self).write_fifo(byte);
    }
}
