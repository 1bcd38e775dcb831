//! ROM busy-wait and software reset.

use embedded_hal::delay::DelayNs;
use platform::SystemControl;

extern "C" {
    fn ets_delay_us(us: u32);
    fn software_reset();
}

/// Chip-level control through the mask ROM.
pub struct Esp32System;

impl DelayNs for Esp32System {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_us(ns.div_ceil(1000));
    }

    fn delay_us(&mut self, us: u32) {
        // SAFETY: ROM routine, pure CPU-cycle busy-wait; needs no interrupts
        // and no RAM state.
        unsafe { ets_delay_us(us) };
    }
}

impl SystemControl for Esp32System {
    fn software_reset(&mut self) -> ! {
        // SAFETY: ROM routine; resets both cores and all peripherals.
        unsafe { software_reset() };
        loop {
            core::hint::spin_loop();
        }
    }
}
