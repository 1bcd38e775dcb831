//! Fault dispatcher and recovery selector.
//!
//! # Flow
//!
//! ```text
//!  panic entry ──────────┐          ┌── unhandled-exception entry
//!   stall companion      │          │    stall companion
//!   banner + reason      │          │    banner + EXCCAUSE name
//!   debug cause bits     │          │
//!   OCD attached? ─ yes → break.n   │    OCD attached? ─ yes → ibreak0 = pc, return
//!                        ↓          ↓
//!                     common handler (terminal)
//!                       watchdog → 1 s system reset
//!                       register dump   (skipped after abort())
//!                       backtrace
//!                       recovery action → Terminal
//! ```
//!
//! [`FaultHandler::process_panic`] and [`FaultHandler::process_unhandled_exception`]
//! do everything up to the final diverging step and report what that step
//! is; [`FaultHandler::finish`] performs it. The `handle_*` wrappers chain
//! the two for the trap vectors.
//!
//! Nothing in here can fail outward. Every lookup has a default and every
//! stack read is bounds-checked by [`StackWindow`].

use platform::{
    CpuControl, SpecialRegister, SystemControl, TxFifo, WatchdogRegisters, WordReader,
};

use crate::abort::{self, FaultState};
use crate::backtrace::{print_backtrace, StackWindow};
use crate::cause::{DebugCause, ExceptionCause, PanicReason};
use crate::config::{FaultConfig, RecoveryAction};
use crate::console::Console;
use crate::cores::halt_companion_core;
use crate::debug::set_instruction_breakpoint;
use crate::frame::ExceptionFrame;
use crate::hook::{report_stack_overflow, HookSlot, TaskHandle};
use crate::recovery::{CrashDumpWriter, DebugStub, DumpTarget, Outcome, Terminal};
use crate::regdump::print_register_dump;
use crate::watchdog;

/// Milliseconds waited before a software reset so the UART FIFO drains.
pub const REBOOT_DRAIN_MS: u32 = 100;

/// Everything the fault path touches, owned for the duration of one
/// incident.
pub struct FaultHandler<'a, T, C, W, M, S> {
    console: Console<T>,
    cpu: C,
    watchdog: W,
    stack: StackWindow<M>,
    system: S,
    config: FaultConfig,
    state: &'a FaultState,
    debug_stub: Option<&'a mut dyn DebugStub>,
    dump_writer: Option<&'a mut dyn CrashDumpWriter>,
}

impl<'a, T, C, W, M, S> FaultHandler<'a, T, C, W, M, S>
where
    T: TxFifo,
    C: CpuControl,
    W: WatchdogRegisters,
    M: WordReader,
    S: SystemControl,
{
    /// Assemble a handler. The diagnostic channel honours
    /// [`FaultConfig::effective_diagnostics`].
    pub fn new(
        tx: T,
        cpu: C,
        watchdog: W,
        memory: M,
        system: S,
        config: FaultConfig,
        state: &'a FaultState,
    ) -> Self {
        Self {
            console: Console::new(tx, config.effective_diagnostics()),
            cpu,
            watchdog,
            stack: StackWindow::new(memory, config.unwind),
            system,
            config,
            state,
            debug_stub: None,
            dump_writer: None,
        }
    }

    /// Provide the GDB stub for [`RecoveryAction::DebugStub`].
    #[must_use]
    pub fn with_debug_stub(mut self, stub: &'a mut dyn DebugStub) -> Self {
        self.debug_stub = Some(stub);
        self
    }

    /// Provide the core-dump writer for the persist actions.
    #[must_use]
    pub fn with_dump_writer(mut self, writer: &'a mut dyn CrashDumpWriter) -> Self {
        self.dump_writer = Some(writer);
        self
    }

    /// Diagnostic channel.
    pub fn console(&self) -> &Console<T> {
        &self.console
    }

    /// CPU control.
    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    /// Watchdog registers.
    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }

    /// System control.
    pub fn system(&self) -> &S {
        &self.system
    }

    /// Configuration in force.
    pub fn config(&self) -> &FaultConfig {
        &self.config
    }

    // ── Entry points ────────────────────────────────────────────────────────

    /// Structured-panic entry (`EXCCAUSE` holds a [`PanicReason`] code).
    pub fn process_panic(&mut self, frame: &ExceptionFrame) -> Outcome {
        halt_companion_core(&mut self.cpu);
        self.console.put_str("Guru Meditation Error: Core ");
        self.console.put_dec(self.cpu.core_id().index());
        self.console.put_str(" panic'ed (");

        if self.state.abort.is_raised() {
            self.console.put_str("abort)\r\n");
        } else {
            let reason = PanicReason::from_code(frame.exccause);
            self.console.put_str(reason.label());
            self.console.put_str(")\r\n");
            if reason == PanicReason::DebugException {
                self.print_debug_cause();
            }
        }

        if self.cpu.debugger_attached() {
            self.cpu.debugger_break();
            return Outcome::ResumedForDebugger;
        }
        Outcome::Terminal(self.common_handler(frame))
    }

    /// Unhandled-exception entry (`EXCCAUSE` holds the raw Xtensa cause).
    ///
    /// With a debugger attached this arms instruction breakpoint 0 at the
    /// faulting pc and returns, so the debugger stops in the faulting
    /// context. If the same pc comes back while that breakpoint is still
    /// pending, nobody consumed it and the common handler runs instead.
    pub fn process_unhandled_exception(&mut self, frame: &ExceptionFrame) -> Outcome {
        halt_companion_core(&mut self.cpu);
        self.console.put_str("Guru Meditation Error of type ");
        self.console.put_str(ExceptionCause(frame.exccause).name());
        self.console.put_str(" occurred on core ");
        self.console.put_dec(self.cpu.core_id().index());

        let resume_pending = self.state.resume.is_armed_for(frame.pc);
        if self.cpu.debugger_attached() && !resume_pending {
            self.console.put_str(" at pc=0x");
            self.console.put_hex(frame.pc);
            self.console.put_str(". Setting bp and returning..\r\n");
            set_instruction_breakpoint(&mut self.cpu, frame.pc);
            self.state.resume.arm(frame.pc);
            return Outcome::ResumedForDebugger;
        }
        self.state.resume.disarm();

        self.console.put_str(". Exception was unhandled.\r\n");
        Outcome::Terminal(self.common_handler(frame))
    }

    /// Stack-overflow notification. Returns `true` if an installed hook
    /// took it; otherwise the default report has been printed and the
    /// caller must abort.
    pub fn process_stack_overflow(&mut self, hooks: &HookSlot, task: TaskHandle, name: &str) -> bool {
        if hooks.notify(task, name) {
            return true;
        }
        report_stack_overflow(&mut self.console, name);
        false
    }

    // ── Common handler ──────────────────────────────────────────────────────

    /// Watchdog, register dump, backtrace, then the configured recovery
    /// action up to (not including) its diverging step.
    pub fn common_handler(&mut self, frame: &ExceptionFrame) -> Terminal {
        watchdog::reconfigure_for_diagnostics(&mut self.watchdog);

        // After abort() the register window belongs to abort() itself.
        if !self.state.abort.is_raised() {
            print_register_dump(&mut self.console, frame);
        }
        print_backtrace(&mut self.console, &self.stack, frame);

        match self.config.recovery {
            RecoveryAction::DebugStub if self.debug_stub.is_some() => {
                watchdog::disable_all(&mut self.watchdog);
                self.console.put_str("Entering gdb stub now.\r\n");
                Terminal::EnterDebugStub
            }
            RecoveryAction::DebugStub | RecoveryAction::Halt => self.prepare_halt(),
            RecoveryAction::PrintAndReboot | RecoveryAction::SilentReboot => self.prepare_reset(),
            RecoveryAction::PersistToStorage { then_reboot } => {
                self.persist(frame, DumpTarget::Storage);
                self.after_persist(then_reboot)
            }
            RecoveryAction::PersistToStream { then_reboot } => {
                self.persist(frame, DumpTarget::Stream);
                self.after_persist(then_reboot)
            }
        }
    }

    /// Perform the diverging step chosen by the common handler.
    pub fn finish(&mut self, terminal: Terminal, frame: &ExceptionFrame) -> ! {
        match terminal {
            Terminal::Reset => self.system.software_reset(),
            Terminal::EnterDebugStub => match self.debug_stub.as_deref_mut() {
                Some(stub) => stub.enter(frame),
                None => self.cpu.halt(),
            },
            Terminal::Halt => self.cpu.halt(),
        }
    }

    /// Panic entry for the trap vector. Returns only to hand the faulting
    /// context to an attached debugger.
    pub fn handle_panic(&mut self, frame: &ExceptionFrame) {
        if let Outcome::Terminal(terminal) = self.process_panic(frame) {
            self.finish(terminal, frame);
        }
    }

    /// Unhandled-exception entry for the trap vector. Returns only after
    /// arming the resume breakpoint for an attached debugger.
    pub fn handle_unhandled_exception(&mut self, frame: &ExceptionFrame) {
        if let Outcome::Terminal(terminal) = self.process_unhandled_exception(frame) {
            self.finish(terminal, frame);
        }
    }

    /// Stack-overflow entry. Returns only if an installed hook returns.
    pub fn handle_stack_overflow(
        &mut self,
        hooks: &HookSlot,
        task: TaskHandle,
        name: &str,
        return_address: u32,
    ) {
        if !self.process_stack_overflow(hooks, task, name) {
            self.abort(return_address);
        }
    }

    /// `abort()`: print the call site, raise the abort flag, trap forever.
    pub fn abort(&mut self, return_address: u32) -> ! {
        abort::abort(&mut self.console, &mut self.cpu, self.state, return_address)
    }

    // ── Helpers ─────────────────────────────────────────────────────────────

    fn print_debug_cause(&mut self) {
        let cause = DebugCause::from_register(self.cpu.read_special(SpecialRegister::DebugCause));
        self.console.put_str("Debug exception reason: ");
        for token in cause.tokens(self.config.stack_canary_watchpoint) {
            self.console.put_str(token);
            self.console.put_char(b' ');
        }
        self.console.put_str("\r\n");
    }

    fn persist(&mut self, frame: &ExceptionFrame, target: DumpTarget) {
        if let Some(writer) = self.dump_writer.as_deref_mut() {
            writer.persist(frame, target);
        }
    }

    fn after_persist(&mut self, then_reboot: bool) -> Terminal {
        if then_reboot {
            self.prepare_reset()
        } else {
            self.prepare_halt()
        }
    }

    fn prepare_reset(&mut self) -> Terminal {
        self.console.put_str("Rebooting...\r\n");
        for _ in 0..REBOOT_DRAIN_MS {
            self.system.delay_ms(1);
        }
        Terminal::Reset
    }

    fn prepare_halt(&mut self) -> Terminal {
        watchdog::disable_all(&mut self.watchdog);
        self.console.put_str("CPU halted.\r\n");
        Terminal::Halt
    }
}
