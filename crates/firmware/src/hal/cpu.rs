//! Xtensa LX6 special registers, core stall and OCD status.
//!
//! `rsr`/`wsr` encode the register number in the instruction, so every
//! [`SpecialRegister`] gets its own `asm!` arm. Writes to the debug unit are
//! followed by `isync` so they take effect before the next instruction.

use core::arch::asm;

use platform::cpu::{
    OCDDSR_DEBUGMODEPOWERON, OCD_DSR, RTC_CNTL_OPTIONS0_REG, RTC_CNTL_SW_CPU_STALL_REG,
    SW_STALL_APPCPU_C0_SHIFT, SW_STALL_APPCPU_C1_SHIFT, SW_STALL_C0_CODE, SW_STALL_C0_MASK,
    SW_STALL_C1_CODE, SW_STALL_C1_MASK, SW_STALL_PROCPU_C0_SHIFT, SW_STALL_PROCPU_C1_SHIFT,
};
use platform::{CoreId, CpuControl, SpecialRegister};

/// `PRID` bit distinguishing APP_CPU (set) from PRO_CPU (clear).
const PRID_APP_CPU_BIT: u32 = 13;

/// The CPU executing the fault handler.
pub struct Esp32Cpu;

macro_rules! rsr {
    ($name:literal) => {{
        let value: u32;
        // SAFETY: reading a special register has no side effects.
        unsafe { asm!(concat!("rsr.", $name, " {0}"), out(reg) value, options(nomem, nostack)) };
        value
    }};
}

macro_rules! wsr {
    ($name:literal, $value:expr) => {{
        let value: u32 = $value;
        // SAFETY: the fault handler owns the debug unit while it runs;
        // nothing else programs these registers concurrently.
        unsafe {
            asm!(concat!("wsr.", $name, " {0}"), "isync", in(reg) value, options(nostack))
        };
    }};
}

fn rmw_stall_field(reg: u32, shift: u32, mask: u32, code: u32) {
    let ptr = reg as *mut u32;
    // SAFETY: RTC_CNTL registers are always mapped; the companion core is
    // the only other writer and is the one being stalled.
    unsafe {
        let mut value = core::ptr::read_volatile(ptr);
        value &= !(mask << shift);
        value |= code << shift;
        core::ptr::write_volatile(ptr, value);
    }
}

impl CpuControl for Esp32Cpu {
    fn read_special(&self, register: SpecialRegister) -> u32 {
        match register {
            SpecialRegister::IBreakEnable => rsr!("ibreakenable"),
            SpecialRegister::IBreakA0 => rsr!("ibreaka0"),
            SpecialRegister::IBreakA1 => rsr!("ibreaka1"),
            SpecialRegister::DBreakA0 => rsr!("dbreaka0"),
            SpecialRegister::DBreakA1 => rsr!("dbreaka1"),
            SpecialRegister::DBreakC0 => rsr!("dbreakc0"),
            SpecialRegister::DBreakC1 => rsr!("dbreakc1"),
            SpecialRegister::DebugCause => rsr!("debugcause"),
        }
    }

    fn write_special(&mut self, register: SpecialRegister, value: u32) {
        match register {
            SpecialRegister::IBreakEnable => wsr!("ibreakenable", value),
            SpecialRegister::IBreakA0 => wsr!("ibreaka0", value),
            SpecialRegister::IBreakA1 => wsr!("ibreaka1", value),
            SpecialRegister::DBreakA0 => wsr!("dbreaka0", value),
            SpecialRegister::DBreakA1 => wsr!("dbreaka1", value),
            SpecialRegister::DBreakC0 => wsr!("dbreakc0", value),
            SpecialRegister::DBreakC1 => wsr!("dbreakc1", value),
            // Read-only.
            SpecialRegister::DebugCause => {}
        }
    }

    fn core_id(&self) -> CoreId {
        if (rsr!("prid") >> PRID_APP_CPU_BIT) & 1 == 0 {
            CoreId::Pro
        } else {
            CoreId::App
        }
    }

    fn stall_core(&mut self, core: CoreId) {
        let (c0_shift, c1_shift) = match core {
            CoreId::Pro => (SW_STALL_PROCPU_C0_SHIFT, SW_STALL_PROCPU_C1_SHIFT),
            CoreId::App => (SW_STALL_APPCPU_C0_SHIFT, SW_STALL_APPCPU_C1_SHIFT),
        };
        rmw_stall_field(RTC_CNTL_SW_CPU_STALL_REG, c1_shift, SW_STALL_C1_MASK, SW_STALL_C1_CODE);
        rmw_stall_field(RTC_CNTL_OPTIONS0_REG, c0_shift, SW_STALL_C0_MASK, SW_STALL_C0_CODE);
    }

    fn debugger_attached(&self) -> bool {
        let dsr: u32;
        // SAFETY: `rer` from the OCD DSR is a side-effect-free status read.
        unsafe { asm!("rer {0}, {1}", out(reg) dsr, in(reg) OCD_DSR, options(nomem, nostack)) };
        dsr & OCDDSR_DEBUGMODEPOWERON != 0
    }

    fn debugger_break(&mut self) {
        // SAFETY: only called with an OCD attached, which claims the trap.
        unsafe { asm!("break.n 1", options(nostack)) };
    }

    fn trap(&mut self) {
        // SAFETY: re-enters the debug/panic vector; intended.
        unsafe { asm!("break 0,0", options(nostack)) };
    }

    fn halt(&mut self) -> ! {
        loop {
            core::hint::spin_loop();
        }
    }
}
