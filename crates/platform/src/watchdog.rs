//! Timer-group watchdog register file (ESP32 TRM §18)
//!
//! Each of the two timer groups (TIMG0, TIMG1) carries one main system
//! watchdog (MWDT). Its configuration registers are write-protected: software
//! must write [`WDT_WRITE_KEY`] to `WDTWPROTECT` before touching them and
//! should write zero afterwards to re-lock.
//!
//! # `WDTCONFIG0` layout
//!
//! | Bits    | Field              |
//! |---------|--------------------|
//! | 31      | `EN`               |
//! | 30:29   | `STG0` action      |
//! | 28:27   | `STG1` action      |
//! | 26:25   | `STG2` action      |
//! | 24:23   | `STG3` action      |
//! | 20:18   | `CPU_RESET_LENGTH` |
//! | 17:15   | `SYS_RESET_LENGTH` |
//! | 14      | `FLASHBOOT_MOD_EN` |
//!
//! `WDTCONFIG1[31:16]` is the clock prescaler; `WDTCONFIG2` is the stage-0
//! timeout in prescaled ticks.

/// TIMG0 base address.
pub const TIMG0_BASE: u32 = 0x3FF5_F000;

/// TIMG1 base address.
pub const TIMG1_BASE: u32 = 0x3FF6_0000;

/// Unlock key for `WDTWPROTECT`.
pub const WDT_WRITE_KEY: u32 = 0x50D8_3AA1;

/// `WDTCONFIG0.EN`
pub const WDT_EN: u32 = 1 << 31;
/// Shift of `WDTCONFIG0.STG0`.
pub const WDT_STG0_SHIFT: u32 = 29;
/// Width mask of a stage action field.
pub const WDT_STG_MASK: u32 = 0x3;
/// Stage action: reset the whole system.
pub const WDT_STG_SEL_RESET_SYSTEM: u32 = 3;
/// Shift of `WDTCONFIG0.CPU_RESET_LENGTH`.
pub const WDT_CPU_RESET_LENGTH_SHIFT: u32 = 18;
/// Shift of `WDTCONFIG0.SYS_RESET_LENGTH`.
pub const WDT_SYS_RESET_LENGTH_SHIFT: u32 = 15;
/// Width mask of the reset-length fields.
pub const WDT_RESET_LENGTH_MASK: u32 = 0x7;
/// Shift of `WDTCONFIG1.CLK_PRESCALE`.
pub const WDT_CLK_PRESCALE_SHIFT: u32 = 16;
/// Width mask of `WDTCONFIG1.CLK_PRESCALE`.
pub const WDT_CLK_PRESCALE_MASK: u32 = 0xFFFF;

/// One of the two timer groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerGroup {
    /// TIMG0: primary watchdog, kept as the panic safety net.
    Tg0,
    /// TIMG1: secondary watchdog.
    Tg1,
}

impl TimerGroup {
    /// Base address of the group's register block.
    pub const fn base(self) -> u32 {
        match self {
            Self::Tg0 => TIMG0_BASE,
            Self::Tg1 => TIMG1_BASE,
        }
    }
}

/// Watchdog registers within a timer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WdtRegister {
    /// `TIMG_WDTCONFIG0`: enable, stage actions, reset pulse lengths.
    Config0,
    /// `TIMG_WDTCONFIG1`: clock prescaler.
    Config1,
    /// `TIMG_WDTCONFIG2`: stage-0 timeout.
    Config2,
    /// `TIMG_WDTFEED`: any write feeds the watchdog.
    Feed,
    /// `TIMG_WDTWPROTECT`: write-protect key.
    WriteProtect,
}

impl WdtRegister {
    /// Offset from the timer-group base.
    pub const fn offset(self) -> u32 {
        match self {
            Self::Config0 => 0x48,
            Self::Config1 => 0x4C,
            Self::Config2 => 0x50,
            Self::Feed => 0x60,
            Self::WriteProtect => 0x64,
        }
    }

    /// Absolute MMIO address in `group`.
    pub const fn address(self, group: TimerGroup) -> u32 {
        group.base().wrapping_add(self.offset())
    }
}

/// Raw access to the watchdog registers.
///
/// The unlock/re-lock protocol is the caller's job; implementations only move
/// words.
pub trait WatchdogRegisters {
    /// Read a watchdog register.
    fn read(&self, group: TimerGroup, register: WdtRegister) -> u32;

    /// Write a watchdog register.
    fn write(&mut self, group: TimerGroup, register: WdtRegister, value: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wdt_addresses() {
        assert_eq!(WdtRegister::Config0.address(TimerGroup::Tg0), 0x3FF5_F048);
        assert_eq!(WdtRegister::WriteProtect.address(TimerGroup::Tg0), 0x3FF5_F064);
        assert_eq!(WdtRegister::Feed.address(TimerGroup::Tg1), 0x3FF6_0060);
    }
}
