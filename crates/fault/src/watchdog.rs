//! Watchdog controller.
//!
//! The production watchdogs may be configured with deadlines far shorter than
//! it takes to push a register dump and backtrace through a 115200-baud UART.
//! Disabling them outright is no better: if the fault handler itself hangs,
//! nothing would ever reset the chip. [`reconfigure_for_diagnostics`] keeps
//! exactly one watchdog armed with a one-second deadline.
//!
//! Every register group is bracketed by an unlock (write key) and a re-lock
//! (key = 0).

use platform::watchdog::{
    WDT_CLK_PRESCALE_MASK, WDT_CLK_PRESCALE_SHIFT, WDT_CPU_RESET_LENGTH_SHIFT, WDT_EN,
    WDT_RESET_LENGTH_MASK, WDT_STG0_SHIFT, WDT_STG_MASK, WDT_STG_SEL_RESET_SYSTEM,
    WDT_SYS_RESET_LENGTH_SHIFT, WDT_WRITE_KEY,
};
use platform::{TimerGroup, WatchdogRegisters, WdtRegister};

/// Reset pulse length code 7 = 3.2 µs.
pub const RESET_PULSE_LENGTH: u32 = 7;

/// 80 MHz APB / 40 000 = one tick every 0.5 ms.
pub const DIAGNOSTIC_PRESCALER: u32 = 80 * 500;

/// 2 000 ticks × 0.5 ms = 1 s.
pub const DIAGNOSTIC_TIMEOUT_TICKS: u32 = 2000;

/// Timer group kept armed as the fault handler's safety net.
pub const PRIMARY: TimerGroup = TimerGroup::Tg0;

/// Timer group switched off during fault handling.
pub const SECONDARY: TimerGroup = TimerGroup::Tg1;

fn with_unlocked<W: WatchdogRegisters>(wdt: &mut W, group: TimerGroup, f: impl FnOnce(&mut W)) {
    wdt.write(group, WdtRegister::WriteProtect, WDT_WRITE_KEY);
    f(wdt);
    wdt.write(group, WdtRegister::WriteProtect, 0);
}

fn disable<W: WatchdogRegisters>(wdt: &mut W, group: TimerGroup) {
    with_unlocked(wdt, group, |w| {
        let config0 = w.read(group, WdtRegister::Config0);
        w.write(group, WdtRegister::Config0, config0 & !WDT_EN);
    });
}

/// Feed the primary watchdog and rearm it to reset the whole system one
/// second from now; disable the secondary watchdog.
pub fn reconfigure_for_diagnostics<W: WatchdogRegisters>(wdt: &mut W) {
    with_unlocked(wdt, PRIMARY, |w| {
        w.write(PRIMARY, WdtRegister::Feed, 1);

        let mut config0 = w.read(PRIMARY, WdtRegister::Config0);
        config0 &= !(WDT_RESET_LENGTH_MASK << WDT_SYS_RESET_LENGTH_SHIFT);
        config0 |= RESET_PULSE_LENGTH << WDT_SYS_RESET_LENGTH_SHIFT;
        config0 &= !(WDT_RESET_LENGTH_MASK << WDT_CPU_RESET_LENGTH_SHIFT);
        config0 |= RESET_PULSE_LENGTH << WDT_CPU_RESET_LENGTH_SHIFT;
        config0 &= !(WDT_STG_MASK << WDT_STG0_SHIFT);
        config0 |= WDT_STG_SEL_RESET_SYSTEM << WDT_STG0_SHIFT;
        w.write(PRIMARY, WdtRegister::Config0, config0);

        let mut config1 = w.read(PRIMARY, WdtRegister::Config1);
        config1 &= !(WDT_CLK_PRESCALE_MASK << WDT_CLK_PRESCALE_SHIFT);
        config1 |= DIAGNOSTIC_PRESCALER << WDT_CLK_PRESCALE_SHIFT;
        w.write(PRIMARY, WdtRegister::Config1, config1);

        w.write(PRIMARY, WdtRegister::Config2, DIAGNOSTIC_TIMEOUT_TICKS);

        let config0 = w.read(PRIMARY, WdtRegister::Config0);
        w.write(PRIMARY, WdtRegister::Config0, config0 | WDT_EN);
    });
    disable(wdt, SECONDARY);
}

/// Disable both watchdogs. Only for the attached-debugger and halt paths,
/// where a reset mid-session is worse than no safety net.
pub fn disable_all<W: WatchdogRegisters>(wdt: &mut W) {
    disable(wdt, PRIMARY);
    disable(wdt, SECONDARY);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use platform::mocks::MockWatchdog;

    #[test]
    fn test_diagnostic_deadline_is_one_second() {
        // 80 MHz / prescaler = ticks per second; timeout ticks / that = seconds.
        let ticks_per_second = 80_000_000 / DIAGNOSTIC_PRESCALER;
        assert_eq!(ticks_per_second, 2000);
        assert_eq!(DIAGNOSTIC_TIMEOUT_TICKS / ticks_per_second, 1);
    }

    #[test]
    fn test_reconfigure_programs_primary() {
        let mut wdt = MockWatchdog::new();
        reconfigure_for_diagnostics(&mut wdt);

        assert_eq!(wdt.rejected_writes(), 0);
        assert_eq!(wdt.feeds(TimerGroup::Tg0), 1);
        let config0 = wdt.read(TimerGroup::Tg0, WdtRegister::Config0);
        assert_ne!(config0 & WDT_EN, 0);
        assert_eq!((config0 >> WDT_STG0_SHIFT) & WDT_STG_MASK, WDT_STG_SEL_RESET_SYSTEM);
        assert_eq!((config0 >> WDT_SYS_RESET_LENGTH_SHIFT) & WDT_RESET_LENGTH_MASK, 7);
        assert_eq!((config0 >> WDT_CPU_RESET_LENGTH_SHIFT) & WDT_RESET_LENGTH_MASK, 7);
        let config1 = wdt.read(TimerGroup::Tg0, WdtRegister::Config1);
        assert_eq!(config1 >> WDT_CLK_PRESCALE_SHIFT, 40_000);
        assert_eq!(wdt.read(TimerGroup::Tg0, WdtRegister::Config2), 2000);
    }

    #[test]
    fn test_reconfigure_disables_secondary() {
        let mut wdt = MockWatchdog::new();
        reconfigure_for_diagnostics(&mut wdt);
        assert!(wdt.is_enabled(TimerGroup::Tg0));
        assert!(!wdt.is_enabled(TimerGroup::Tg1));
    }

    #[test]
    fn test_every_group_is_relocked() {
        let mut wdt = MockWatchdog::new();
        reconfigure_for_diagnostics(&mut wdt);
        disable_all(&mut wdt);
        assert!(!wdt.is_unlocked(TimerGroup::Tg0));
        assert!(!wdt.is_unlocked(TimerGroup::Tg1));

        let writes = wdt.writes();
        assert_eq!(writes[0], (TimerGroup::Tg0, WdtRegister::WriteProtect, WDT_WRITE_KEY));
        assert_eq!(
            *writes.last().unwrap(),
            (TimerGroup::Tg1, WdtRegister::WriteProtect, 0)
        );
    }

    #[test]
    fn test_disable_all() {
        let mut wdt = MockWatchdog::new();
        disable_all(&mut wdt);
        assert!(!wdt.is_enabled(TimerGroup::Tg0));
        assert!(!wdt.is_enabled(TimerGroup::Tg1));
        assert_eq!(wdt.rejected_writes(), 0);
    }
}
