//! End-to-end fault scenarios against the host mocks.
//! Each test drives a full entry point and checks the exact console output
//! and hardware side effects an operator would see.
#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use fault::regdump::REGISTER_NAMES;
use fault::{
    set_watchpoint, ExceptionCause, ExceptionFrame, FaultConfig, FaultHandler, FaultState,
    Outcome, PanicReason, Terminal, UnwindConfig, WatchpointArgument, WatchpointError,
};
use platform::mocks::{MockCpu, MockStack, MockSystem, MockUart, MockWatchdog};
use platform::{CoreId, TimerGroup};

type Handler<'a> = FaultHandler<'a, MockUart, MockCpu, MockWatchdog, MockStack, MockSystem>;

const SP: u32 = 0x3FFB_2000;
const CALLER_SP: u32 = 0x3FFB_2040;

fn handler_with_stack(state: &FaultState, stack: MockStack) -> Handler<'_> {
    FaultHandler::new(
        MockUart::new(),
        MockCpu::new(CoreId::Pro),
        MockWatchdog::new(),
        stack,
        MockSystem::new(),
        FaultConfig::DEFAULT,
        state,
    )
}

fn two_frame_stack() -> MockStack {
    let mut stack = MockStack::new();
    // Outermost caller: return address below the code base ends the walk.
    stack.push_frame(SP, 0x0000_0000, CALLER_SP);
    stack
}

// ── Scenario A: LoadProhibited ───────────────────────────────────────────────

#[test]
fn load_prohibited_prints_name_and_full_register_table() {
    let state = FaultState::new();
    let mut h = handler_with_stack(&state, two_frame_stack());
    let mut frame = ExceptionFrame::new(0x400D_5678, SP, 0x800D_1111, ExceptionCause::LOAD_PROHIBITED.0);
    frame.excvaddr = 0x0000_0004;

    let outcome = h.process_unhandled_exception(&frame);
    assert_eq!(outcome, Outcome::Terminal(Terminal::Reset));

    let out = h.console().inner().output();
    assert!(out.contains("Guru Meditation Error of type LoadProhibited occurred on core  0"));
    for name in REGISTER_NAMES {
        assert!(out.contains(&format!("{name}: 0x")), "register {name:?} missing");
    }
    assert!(out.contains("EXCVADDR: 0x00000004"));
    assert!(out.contains("\r\nBacktrace: 0x400d5678:0x3ffb2000 0x400d1111:0x3ffb2040\r\n\r\n"));
}

#[test]
fn cause_27_is_reserved_not_load_prohibited() {
    assert_eq!(ExceptionCause(27).name(), "res");
    assert_eq!(ExceptionCause(28).name(), "LoadProhibited");
}

// ── Scenario B: out-of-range cause ───────────────────────────────────────────

#[test]
fn out_of_range_cause_prints_unknown() {
    let state = FaultState::new();
    let mut h = handler_with_stack(&state, two_frame_stack());
    h.process_unhandled_exception(&ExceptionFrame::new(0x400D_5678, SP, 0, 200));
    assert!(h
        .console()
        .inner()
        .output()
        .contains("Guru Meditation Error of type Unknown occurred on core"));
}

#[test]
fn out_of_range_panic_reason_prints_unknown_reason() {
    let state = FaultState::new();
    let mut h = handler_with_stack(&state, two_frame_stack());
    h.process_panic(&ExceptionFrame::new(0x400D_5678, SP, 0, 200));
    assert!(h.console().inner().output().contains("panic'ed (Unknown reason)"));
}

// ── Scenario C: bad watchpoint size ──────────────────────────────────────────

#[test]
fn non_power_of_two_watch_size_is_rejected_without_writes() {
    let mut cpu = MockCpu::new(CoreId::Pro);
    let result = set_watchpoint(&mut cpu, 0, 0x3FFB_0000, 3, 0);
    assert_eq!(
        result,
        Err(WatchpointError::InvalidArgument(WatchpointArgument::InvalidSize))
    );
    assert!(cpu.writes().is_empty());
}

// ── Scenario D: abort ────────────────────────────────────────────────────────

#[test]
fn abort_then_trap_prints_abort_banner_without_registers() {
    let state = FaultState::new();

    // abort(): banner, flag. The trap that follows re-enters the panic entry.
    let mut console = fault::Console::new(MockUart::new(), fault::DiagnosticOutput::Enabled);
    fault::abort::record_abort(&mut console, &state, 0x400D_0A0B);
    assert!(state.abort.is_raised());
    assert_eq!(console.inner().output(), "abort() was called at PC 0x400d0a08\r\n");

    let mut h = handler_with_stack(&state, two_frame_stack());
    let frame = ExceptionFrame::new(0x400D_0A08, SP, 0x800D_2222, PanicReason::DebugException as u32);
    let outcome = h.process_panic(&frame);

    assert_eq!(outcome, Outcome::Terminal(Terminal::Reset));
    let out = h.console().inner().output();
    assert!(out.starts_with("Guru Meditation Error: Core  0 panic'ed (abort)\r\n"));
    assert!(!out.contains("Register dump"));
    assert!(!out.contains("Debug exception reason"));
    assert!(out.contains("Backtrace: 0x400d0a08:0x3ffb2000"));
    // Still raised after a full pass through the handler.
    assert!(state.abort.is_raised());
}

// ── Scenario E: stack pointer just below the window ──────────────────────────

#[test]
fn stack_pointer_below_window_emits_only_first_frame() {
    let state = FaultState::new();
    let low = UnwindConfig::ESP32.stack_low;
    let mut h = handler_with_stack(&state, MockStack::new());
    h.process_unhandled_exception(&ExceptionFrame::new(0x400D_5678, low - 1, 0x800D_1111, 0));

    let out = h.console().inner().output();
    let expected = format!("\r\nBacktrace: 0x400d5678:0x{:08x}\r\n\r\n", low - 1);
    assert!(out.contains(&expected), "{out}");
}

// ── Cross-cutting ────────────────────────────────────────────────────────────

#[test]
fn companion_core_is_stalled_before_anything_else() {
    let state = FaultState::new();
    let mut h = FaultHandler::new(
        MockUart::new(),
        MockCpu::new(CoreId::App),
        MockWatchdog::new(),
        MockStack::new(),
        MockSystem::new(),
        FaultConfig::DEFAULT,
        &state,
    );
    h.process_panic(&ExceptionFrame::new(0x400D_0000, SP, 0, 0));
    assert_eq!(h.cpu().stalled(), Some(CoreId::Pro));
}

#[test]
fn diagnostic_watchdog_survives_the_whole_dump() {
    let state = FaultState::new();
    let mut h = handler_with_stack(&state, two_frame_stack());
    h.process_panic(&ExceptionFrame::new(0x400D_0000, SP, 0, 0));

    let wdt = h.watchdog();
    assert!(wdt.is_enabled(TimerGroup::Tg0));
    assert!(!wdt.is_enabled(TimerGroup::Tg1));
    assert!(!wdt.is_unlocked(TimerGroup::Tg0));
    assert!(!wdt.is_unlocked(TimerGroup::Tg1));
    assert_eq!(wdt.feeds(TimerGroup::Tg0), 1);
}

#[test]
fn stalled_uart_delays_but_does_not_lose_output() {
    let state = FaultState::new();
    let mut uart = MockUart::new();
    uart.stall_for(500);
    let mut h = FaultHandler::new(
        uart,
        MockCpu::new(CoreId::Pro),
        MockWatchdog::new(),
        MockStack::new(),
        MockSystem::new(),
        FaultConfig::DEFAULT,
        &state,
    );
    h.process_panic(&ExceptionFrame::new(0x400D_0000, SP, 0, 2));
    assert!(h.console().inner().output().starts_with("Guru Meditation Error: Core  0 panic'ed (Double exception)"));
    assert!(h.console().inner().polls() > 500);
}
