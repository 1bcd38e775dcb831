//! Property-based tests for the fault path.
//! Lookups stay in bounds, the unwinder always terminates, and watchpoint
//! validation never touches hardware on rejection.
#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use fault::cause::{panic_reason_label, EXCEPTION_NAMES, PANIC_REASONS};
use fault::debug::{watched_size, MAX_WATCH_SIZE};
use fault::{
    clear_watchpoint, set_watchpoint, Backtrace, ExceptionCause, ExceptionFrame, StackWindow,
    UnwindConfig, WatchpointFlags,
};
use platform::mocks::{MockCpu, MockStack};
use platform::{CoreId, CpuControl, SpecialRegister};

proptest::proptest! {
    /// Any cause code resolves to a table entry or the "Unknown" default.
    #[test]
    fn exception_name_is_total(code in 0u32..=u32::MAX) {
        let name = ExceptionCause(code).name();
        if code < 40 {
            assert_eq!(name, EXCEPTION_NAMES[code as usize]);
        } else {
            assert_eq!(name, "Unknown");
        }
    }

    /// Panic reasons past the table map to "Unknown reason".
    #[test]
    fn panic_reason_is_total(code in 0u32..=u32::MAX) {
        let label = panic_reason_label(code);
        if code < 7 {
            assert_eq!(label, PANIC_REASONS[code as usize]);
        } else {
            assert_eq!(label, "Unknown reason");
        }
    }

    /// An insane initial stack pointer yields exactly one entry and no reads.
    #[test]
    fn insane_stack_pointer_stops_before_dereference(
        sp in proptest::prop_oneof![0u32..0x3FFA_E010, 0x3FFF_FFF1u32..=u32::MAX],
        pc in 0u32..=u32::MAX,
    ) {
        let window = StackWindow::new(MockStack::new(), UnwindConfig::ESP32);
        let frame = ExceptionFrame::new(pc, sp, 0x800D_0000, 0);
        let count = Backtrace::new(&window, &frame).count();
        assert_eq!(count, 1);
    }

    /// Misaligned stack pointers inside the window are rejected too.
    #[test]
    fn misaligned_stack_pointer_stops(offset in 0u32..0x1000, low_bits in 1u32..16) {
        let sp = 0x3FFB_0000 + offset * 16 + low_bits;
        let window = StackWindow::new(MockStack::new(), UnwindConfig::ESP32);
        let frame = ExceptionFrame::new(0x400D_0000, sp, 0x800D_0000, 0);
        assert_eq!(Backtrace::new(&window, &frame).count(), 1);
    }

    /// Arbitrary stack contents: the walk ends within the cap, every
    /// emitted pc is normalised, and every read stays inside the window.
    #[test]
    fn unwinder_terminates_on_arbitrary_stacks(
        words in proptest::collection::vec((0u32..64, 0u32..=u32::MAX), 0..48),
        ra in 0u32..=u32::MAX,
    ) {
        let mut stack = MockStack::new();
        let base = 0x3FFB_0000u32;
        for (slot, value) in &words {
            stack.poke(base + slot * 4, *value);
        }
        let config = UnwindConfig::ESP32;
        let window = StackWindow::new(stack, config);
        let frame = ExceptionFrame::new(0x400D_0000, base + 0x80, ra, 0);

        let entries: Vec<_> = Backtrace::new(&window, &frame).collect();
        assert!(!entries.is_empty());
        assert!(entries.len() <= config.max_depth);
        for entry in &entries {
            assert_eq!(entry.pc & 0x8000_0000, 0);
        }
    }

    /// Every rejected watchpoint leaves the debug registers untouched.
    #[test]
    fn invalid_watchpoints_write_nothing(
        slot in 0usize..8,
        size in 0u32..256,
        flags in 0u32..=u32::MAX,
    ) {
        let mut cpu = MockCpu::new(CoreId::Pro);
        let valid_slot = slot < 2;
        let valid_size = size.is_power_of_two() && size <= MAX_WATCH_SIZE;
        let valid_flags = flags & !(WatchpointFlags::all().bits()) == 0;

        let result = set_watchpoint(&mut cpu, slot, 0x3FFB_0000, size, flags);
        if valid_slot && valid_size && valid_flags {
            assert!(result.is_ok());
            let control = cpu.read_special(
                if slot == 0 { SpecialRegister::DBreakC0 } else { SpecialRegister::DBreakC1 },
            );
            assert_eq!(watched_size(control), size);
            assert_eq!(control & !0x3F, flags);
        } else {
            assert!(result.is_err());
            assert!(cpu.writes().is_empty());
        }
    }

    /// Clearing always leaves the slot disabled.
    #[test]
    fn clear_always_disables(slot in 0usize..2, size_log2 in 0u32..=6, flags in 0u32..4) {
        let mut cpu = MockCpu::new(CoreId::App);
        set_watchpoint(&mut cpu, slot, 0x3FFB_0000, 1 << size_log2, flags << 30).unwrap();
        clear_watchpoint(&mut cpu, slot);
        let register = if slot == 0 { SpecialRegister::DBreakC0 } else { SpecialRegister::DBreakC1 };
        assert_eq!(cpu.read_special(register), 0);
        assert!(!fault::debug::watchpoint_enabled(cpu.read_special(register)));
    }
}
