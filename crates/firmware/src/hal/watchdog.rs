//! Timer-group watchdog registers.

use platform::{TimerGroup, WatchdogRegisters, WdtRegister};

/// TIMG0/TIMG1 main watchdogs.
pub struct Esp32Watchdog;

impl WatchdogRegisters for Esp32Watchdog {
    fn read(&self, group: TimerGroup, register: WdtRegister) -> u32 {
        // SAFETY: `WdtRegister::address` yields a mapped TIMG register.
        unsafe { core::ptr::read_volatile(register.address(group) as *const u32) }
    }

    fn write(&mut self, group: TimerGroup, register: WdtRegister, value: u32) {
        // SAFETY: as above; write protection is the caller's concern.
        unsafe { core::ptr::write_volatile(register.address(group) as *mut u32, value) };
    }
}
