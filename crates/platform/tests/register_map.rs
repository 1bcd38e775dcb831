//! Register-map tests for the ESP32 constants the fault path depends on.
//! A wrong offset here means the handler pokes the wrong peripheral, so the
//! addresses are pinned against the technical reference manual.
#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use platform::console::{UART0_FIFO_REG, UART0_STATUS_REG, UART_TXFIFO_CNT_MASK, UART_TXFIFO_CNT_SHIFT};
use platform::cpu::{
    RTC_CNTL_OPTIONS0_REG, RTC_CNTL_SW_CPU_STALL_REG, SW_STALL_APPCPU_C0_SHIFT,
    SW_STALL_APPCPU_C1_SHIFT, SW_STALL_C0_MASK, SW_STALL_C1_MASK, SW_STALL_PROCPU_C0_SHIFT,
    SW_STALL_PROCPU_C1_SHIFT,
};
use platform::watchdog::{TIMG0_BASE, TIMG1_BASE};
use platform::{CoreId, SpecialRegister, TimerGroup, WdtRegister};

// ── UART0 ────────────────────────────────────────────────────────────────────

#[test]
fn uart0_registers() {
    assert_eq!(UART0_FIFO_REG, 0x3FF4_0000);
    assert_eq!(UART0_STATUS_REG, UART0_FIFO_REG + 0x1C);
    // TXFIFO_CNT is STATUS[23:16]
    assert_eq!(UART_TXFIFO_CNT_MASK << UART_TXFIFO_CNT_SHIFT, 0x00FF_0000);
}

// ── RTC_CNTL stall fields ────────────────────────────────────────────────────

#[test]
fn stall_registers() {
    assert_eq!(RTC_CNTL_OPTIONS0_REG, 0x3FF4_8000);
    assert_eq!(RTC_CNTL_SW_CPU_STALL_REG, 0x3FF4_80AC);
}

#[test]
fn stall_fields_do_not_overlap() {
    let c0_app = SW_STALL_C0_MASK << SW_STALL_APPCPU_C0_SHIFT;
    let c0_pro = SW_STALL_C0_MASK << SW_STALL_PROCPU_C0_SHIFT;
    let c1_app = SW_STALL_C1_MASK << SW_STALL_APPCPU_C1_SHIFT;
    let c1_pro = SW_STALL_C1_MASK << SW_STALL_PROCPU_C1_SHIFT;
    assert_eq!(c0_app & c0_pro, 0);
    assert_eq!(c1_app & c1_pro, 0);
    // C1 fields are the top 12 bits of the stall register.
    assert_eq!(c1_app | c1_pro, 0xFFF0_0000);
}

// ── Cores ────────────────────────────────────────────────────────────────────

#[test]
fn core_other_is_an_involution() {
    for core in [CoreId::Pro, CoreId::App] {
        assert_ne!(core.other(), core);
        assert_eq!(core.other().other(), core);
    }
    assert_eq!(CoreId::Pro.index(), 0);
    assert_eq!(CoreId::App.index(), 1);
}

// ── Special registers ────────────────────────────────────────────────────────

#[test]
fn special_register_numbers_are_unique_and_ordered() {
    let numbers = SpecialRegister::ALL.map(SpecialRegister::number);
    for pair in numbers.windows(2) {
        assert!(pair[0] < pair[1], "{pair:?} out of order");
    }
}

#[test]
fn dbreak_slots() {
    assert_eq!(SpecialRegister::dbreak_address(0), Some(SpecialRegister::DBreakA0));
    assert_eq!(SpecialRegister::dbreak_control(1), Some(SpecialRegister::DBreakC1));
    assert_eq!(SpecialRegister::dbreak_address(2), None);
    assert_eq!(SpecialRegister::dbreak_control(usize::MAX), None);
}

// ── Timer-group watchdogs ────────────────────────────────────────────────────

#[test]
fn timer_group_bases() {
    assert_eq!(TimerGroup::Tg0.base(), TIMG0_BASE);
    assert_eq!(TimerGroup::Tg1.base(), TIMG1_BASE);
    assert_eq!(TIMG1_BASE - TIMG0_BASE, 0x1000);
}

proptest::proptest! {
    /// Every watchdog register stays inside its group's 4 KiB block.
    #[test]
    fn wdt_registers_stay_in_block(pick in 0usize..5, tg1 in proptest::bool::ANY) {
        let register = [
            WdtRegister::Config0,
            WdtRegister::Config1,
            WdtRegister::Config2,
            WdtRegister::Feed,
            WdtRegister::WriteProtect,
        ][pick];
        let group = if tg1 { TimerGroup::Tg1 } else { TimerGroup::Tg0 };
        let address = register.address(group);
        assert!(address >= group.base());
        assert!(address < group.base() + 0x1000);
        assert_eq!(address % 4, 0);
    }
}
