//! Dual-core fault handler ("Guru Meditation")
//!
//! Last-resort handler for CPU exceptions, structured panics, `abort()` and
//! task stack overflows on a dual-core Xtensa target. It stalls the other
//! core, puts the watchdog on a one-second leash, prints a banner, register
//! dump and backtrace over a polled UART, then takes exactly one recovery
//! action.
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`console`] | Raw diagnostic channel (polled TX FIFO, no allocation) |
//! | [`debug`] | Instruction breakpoints and data watchpoints |
//! | [`watchdog`] | Diagnostic re-arm / disable of the timer-group watchdogs |
//! | [`cores`] | Companion-core stall |
//! | [`cause`] | Panic reasons, `EXCCAUSE` names, `DEBUGCAUSE` bits |
//! | [`backtrace`] | Bounds-checked windowed-ABI stack unwinder |
//! | [`regdump`] | Register table |
//! | [`handler`] | Entry points, common handler, recovery selection |
//! | [`abort`] | Abort flag, resume latch, `abort()` |
//! | [`hook`] | Replaceable stack-overflow callback |
//! | [`recovery`] | GDB stub / core-dump collaborator traits |
//! | [`config`] | Build-time configuration |
//!
//! All hardware access goes through the [`platform`] traits, so everything
//! here runs on the host against `platform::mocks`.
//!
//! # Features
//!
//! - `std`: `std::error::Error` impls
//! - `defmt`: defmt logging and `defmt::Format` derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod abort;
pub mod backtrace;
pub mod cause;
pub mod config;
pub mod console;
pub mod cores;
pub mod debug;
pub mod frame;
pub mod handler;
pub mod hook;
pub mod recovery;
pub mod regdump;
pub mod watchdog;

pub use abort::{AbortFlag, FaultState, ResumeLatch};
pub use backtrace::{Backtrace, CallChainEntry, StackWindow, UnwindConfig, UnwindError};
pub use cause::{DebugCause, ExceptionCause, PanicReason};
pub use config::{FaultConfig, RecoveryAction};
pub use console::{Console, DiagnosticOutput};
pub use debug::{
    arm_breakpoint_if_debugger_attached, clear_watchpoint, set_instruction_breakpoint,
    set_watchpoint, WatchpointArgument, WatchpointConfig, WatchpointError, WatchpointFlags,
};
pub use frame::ExceptionFrame;
pub use handler::FaultHandler;
pub use hook::{HookSlot, StackOverflowHook, TaskHandle};
pub use recovery::{CrashDumpWriter, DebugStub, DumpTarget, Outcome, Terminal};
