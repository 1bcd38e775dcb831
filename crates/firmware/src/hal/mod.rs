//! ESP32 implementations of the `platform` traits.
//!
//! Everything in here touches MMIO or Xtensa special registers and only
//! builds for the target (`hardware` feature). Host builds use
//! `platform::mocks` instead.
//!
//! | Type | Trait | Backing |
//! |------|-------|---------|
//! | `Esp32Uart0` | `TxFifo` | UART0 `FIFO` / `STATUS` registers |
//! | `Esp32Cpu` | `CpuControl` | `rsr`/`wsr`, `RTC_CNTL` stall, OCD `DSR` |
//! | `Esp32Watchdog` | `WatchdogRegisters` | TIMG0/TIMG1 MWDT registers |
//! | `VolatileMemory` | `WordReader` | Volatile loads |
//! | `Esp32System` | `SystemControl` | ROM `ets_delay_us` / `software_reset` |

#[cfg(feature = "hardware")]
mod cpu;
#[cfg(feature = "hardware")]
mod critical_section_impl;
#[cfg(feature = "hardware")]
mod memory;
#[cfg(feature = "hardware")]
mod system;
#[cfg(feature = "hardware")]
mod uart;
#[cfg(feature = "hardware")]
mod watchdog;

#[cfg(feature = "hardware")]
pub use cpu::Esp32Cpu;
#[cfg(feature = "hardware")]
pub use memory::VolatileMemory;
#[cfg(feature = "hardware")]
pub use system::Esp32System;
#[cfg(feature = "hardware")]
pub use uart::Esp32Uart0;
#[cfg(feature = "hardware")]
pub use watchdog::Esp32Watchdog;
