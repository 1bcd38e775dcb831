//! UART0 transmit FIFO via direct register access.

use platform::console::{
    UART0_FIFO_REG, UART0_STATUS_REG, UART_TXFIFO_CNT_MASK, UART_TXFIFO_CNT_SHIFT,
};
use platform::TxFifo;

/// UART0 TX FIFO. Bypasses the UART driver entirely.
pub struct Esp32Uart0;

impl TxFifo for Esp32Uart0 {
    #[allow(clippy::cast_possible_truncation)] // masked to 8 bits
    fn tx_fifo_count(&self) -> u8 {
        // SAFETY: UART0_STATUS_REG is a valid, always-mapped peripheral
        // register; reading it has no side effects.
        let status = unsafe { core::ptr::read_volatile(UART0_STATUS_REG as *const u32) };
        ((status >> UART_TXFIFO_CNT_SHIFT) & UART_TXFIFO_CNT_MASK) as u8
    }

    fn write_fifo(&mut self, byte: u8) {
        // SAFETY: a 32-bit write to the FIFO data port pushes one byte.
        unsafe { core::ptr::write_volatile(UART0_FIFO_REG as *mut u32, u32::from(byte)) };
    }
}
