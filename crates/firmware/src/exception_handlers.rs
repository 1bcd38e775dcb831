//! C-ABI entry points wiring the fault handler into the ESP32 runtime.
//!
//! | Symbol | Called by | Does |
//! |--------|-----------|------|
//! | `panicHandler` | Debug/double/kernel exception vectors, `abort()` trap | Structured-panic entry |
//! | `xt_unhandled_exception` | User exception dispatcher | Unhandled-exception entry |
//! | `abort` | libc, `assert` | Print call site, raise abort flag, trap |
//! | `vApplicationStackOverflowHook` | Scheduler | Hook slot, default report + abort |
//! | `esp_set_breakpoint_if_jtag` | Startup code | Arm ibreak0 if OCD attached |
//! | `esp_set_watchpoint` / `esp_clear_watchpoint` | Anyone | Data watchpoints |
//!
//! External collaborators are resolved at link time and only referenced when
//! the matching recovery feature is on: `esp_gdbstub_panic_handler`
//! (`recovery-debug-stub`), `esp_core_dump_to_flash`
//! (`recovery-coredump-flash`), `esp_core_dump_to_uart`
//! (`recovery-coredump-uart`).
//!
//! # Hardware-only handlers
//!
//! The exported symbols need the Xtensa target and are gated behind
//! `#[cfg(feature = "hardware")]`. The argument conversions and
//! `FAULT_HANDLER_DEFINED` compile unconditionally so host tests cover them.

use core::ffi::{c_char, CStr};

use fault::WatchpointError;

/// Marker constant, confirmed by arch tests to verify this module exists.
pub const FAULT_HANDLER_DEFINED: bool = true;

/// `esp_err_t` success.
pub const ESP_OK: i32 = 0;

/// `esp_err_t` for a rejected argument.
pub const ESP_ERR_INVALID_ARG: i32 = 0x102;

/// Map a watchpoint result onto `esp_err_t`.
pub fn esp_err_from(result: Result<(), WatchpointError>) -> i32 {
    match result {
        Ok(()) => ESP_OK,
        Err(WatchpointError::InvalidArgument(_)) => ESP_ERR_INVALID_ARG,
    }
}

/// C slot number → Rust slot index. Negative slots become an index that
/// validation rejects.
pub fn watchpoint_slot(no: i32) -> usize {
    usize::try_from(no).unwrap_or(usize::MAX)
}

/// C size → byte count. Negative sizes become 0, which validation rejects.
pub fn watchpoint_size(size: i32) -> u32 {
    u32::try_from(size).unwrap_or(0)
}

/// Task name from the scheduler's C string; `"?"` if null or not UTF-8.
///
/// # Safety
///
/// `name` must be null or point to a NUL-terminated string that outlives
/// the returned reference.
pub unsafe fn task_name<'a>(name: *const c_char) -> &'a str {
    if name.is_null() {
        return "?";
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    unsafe { CStr::from_ptr(name) }.to_str().unwrap_or("?")
}

#[cfg(feature = "hardware")]
pub use target::*;

#[cfg(feature = "hardware")]
#[allow(non_snake_case)]
mod target {
    use core::arch::asm;
    use core::ffi::{c_char, c_void};

    use fault::{ExceptionFrame, FaultHandler, FaultState, HookSlot, StackOverflowHook, TaskHandle};

    use platform::CpuControl;

    use super::{esp_err_from, task_name, watchpoint_size, watchpoint_slot};
    use crate::config::FAULT_CONFIG;
    use crate::hal::{Esp32Cpu, Esp32System, Esp32Uart0, Esp32Watchdog, VolatileMemory};

    /// Abort flag and resume latch shared with normal execution.
    pub static FAULT_STATE: FaultState = FaultState::new();

    /// Stack-overflow callback slot.
    pub static STACK_OVERFLOW_HOOK: HookSlot = HookSlot::new();

    type Handler<'a> =
        FaultHandler<'a, Esp32Uart0, Esp32Cpu, Esp32Watchdog, VolatileMemory, Esp32System>;

    extern "C" {
        #[cfg(feature = "recovery-debug-stub")]
        fn esp_gdbstub_panic_handler(frame: *mut ExceptionFrame);
        #[cfg(feature = "recovery-coredump-flash")]
        fn esp_core_dump_to_flash(frame: *mut ExceptionFrame);
        #[cfg(feature = "recovery-coredump-uart")]
        fn esp_core_dump_to_uart(frame: *mut ExceptionFrame);
    }

    #[cfg(feature = "recovery-debug-stub")]
    struct GdbStub;

    #[cfg(feature = "recovery-debug-stub")]
    impl fault::DebugStub for GdbStub {
        fn enter(&mut self, frame: &ExceptionFrame) -> ! {
            // SAFETY: the stub only reads the frame (and may rewrite it for
            // a `G` packet, which we never resume from).
            unsafe { esp_gdbstub_panic_handler((frame as *const ExceptionFrame).cast_mut()) };
            loop {
                core::hint::spin_loop();
            }
        }
    }

    #[cfg(any(feature = "recovery-coredump-flash", feature = "recovery-coredump-uart"))]
    struct CoreDumpWriter;

    #[cfg(any(feature = "recovery-coredump-flash", feature = "recovery-coredump-uart"))]
    impl fault::CrashDumpWriter for CoreDumpWriter {
        fn persist(&mut self, frame: &ExceptionFrame, target: fault::DumpTarget) {
            let frame = (frame as *const ExceptionFrame).cast_mut();
            match target {
                // SAFETY: the writer reads the frame and the task list only.
                #[cfg(feature = "recovery-coredump-flash")]
                fault::DumpTarget::Storage => unsafe { esp_core_dump_to_flash(frame) },
                // SAFETY: as above.
                #[cfg(feature = "recovery-coredump-uart")]
                fault::DumpTarget::Stream => unsafe { esp_core_dump_to_uart(frame) },
                #[allow(unreachable_patterns)]
                _ => {}
            }
        }
    }

    fn with_handler(f: impl FnOnce(&mut Handler<'_>)) {
        #[cfg(feature = "recovery-debug-stub")]
        let mut stub = GdbStub;
        #[cfg(any(feature = "recovery-coredump-flash", feature = "recovery-coredump-uart"))]
        let mut writer = CoreDumpWriter;

        let handler = FaultHandler::new(
            Esp32Uart0,
            Esp32Cpu,
            Esp32Watchdog,
            VolatileMemory,
            Esp32System,
            FAULT_CONFIG,
            &FAULT_STATE,
        );
        #[cfg(feature = "recovery-debug-stub")]
        let handler = handler.with_debug_stub(&mut stub);
        #[cfg(any(feature = "recovery-coredump-flash", feature = "recovery-coredump-uart"))]
        let handler = handler.with_dump_writer(&mut writer);

        let mut handler = handler;
        f(&mut handler)
    }

    /// A0 of the enclosing function's window: its raw return address.
    /// A macro so no call of its own sits between the caller and the read.
    macro_rules! return_address {
        () => {{
            let ra: u32;
            // SAFETY: copies A0 of the current window; no memory access.
            unsafe { asm!("mov {0}, a0", out(reg) ra, options(nomem, nostack)) };
            ra
        }};
    }

    /// Replace the default stack-overflow report.
    pub fn install_stack_overflow_hook(hook: StackOverflowHook) {
        STACK_OVERFLOW_HOOK.install(hook);
    }

    /// Structured-panic entry, called from the exception vectors with the
    /// panic reason in `EXCCAUSE`.
    ///
    /// # Safety
    ///
    /// `frame` must point to the frame saved by the trap entry stub.
    #[no_mangle]
    pub unsafe extern "C" fn panicHandler(frame: *mut ExceptionFrame) {
        // SAFETY: valid per the contract; exclusively ours until we return.
        let Some(frame) = (unsafe { frame.as_ref() }) else {
            return;
        };
        with_handler(|h| h.handle_panic(frame));
    }

    /// Unhandled user exception.
    ///
    /// # Safety
    ///
    /// `frame` must point to the frame saved by the trap entry stub.
    #[no_mangle]
    pub unsafe extern "C" fn xt_unhandled_exception(frame: *mut ExceptionFrame) {
        // SAFETY: as for `panicHandler`.
        let Some(frame) = (unsafe { frame.as_ref() }) else {
            return;
        };
        with_handler(|h| h.handle_unhandled_exception(frame));
    }

    /// libc `abort()`.
    #[no_mangle]
    pub extern "C" fn abort() -> ! {
        let ra = return_address!();
        with_handler(|h| h.abort(ra));
        Esp32Cpu.halt()
    }

    /// Scheduler stack-overflow notification. Without an installed hook the
    /// default report is printed and `abort()` is called from here, so the
    /// reported PC is this call site.
    ///
    /// # Safety
    ///
    /// `name` must be null or a NUL-terminated task name.
    #[no_mangle]
    pub unsafe extern "C" fn vApplicationStackOverflowHook(task: *mut c_void, name: *const c_char) {
        // SAFETY: per the contract above.
        let name = unsafe { task_name(name) };
        let task = TaskHandle(task as usize);
        let mut handled = false;
        with_handler(|h| handled = h.process_stack_overflow(&STACK_OVERFLOW_HOOK, task, name));
        if !handled {
            abort();
        }
    }

    /// Arm instruction breakpoint 0 at `function` if a JTAG adapter is
    /// attached.
    #[no_mangle]
    pub extern "C" fn esp_set_breakpoint_if_jtag(function: *const c_void) {
        fault::arm_breakpoint_if_debugger_attached(&mut Esp32Cpu, function as u32);
    }

    /// Program data watchpoint `no`. Returns `ESP_OK` or
    /// `ESP_ERR_INVALID_ARG`.
    #[no_mangle]
    pub extern "C" fn esp_set_watchpoint(no: i32, address: *mut c_void, size: i32, flags: i32) -> i32 {
        esp_err_from(fault::set_watchpoint(
            &mut Esp32Cpu,
            watchpoint_slot(no),
            address as u32,
            watchpoint_size(size),
            flags as u32,
        ))
    }

    /// Disable data watchpoint `no`.
    #[no_mangle]
    pub extern "C" fn esp_clear_watchpoint(no: i32) {
        fault::clear_watchpoint(&mut Esp32Cpu, watchpoint_slot(no));
    }
}
