//! Recovery collaborators and handler outcomes.
//!
//! The GDB stub and the core-dump writer live outside this crate. The
//! handler reaches them only through these traits, at most once per
//! incident.

use crate::frame::ExceptionFrame;

/// Where a crash dump goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DumpTarget {
    /// Core-dump partition in flash.
    Storage,
    /// Diagnostic UART, base64 framed by the writer.
    Stream,
}

/// Persists a captured frame.
pub trait CrashDumpWriter {
    /// Write the dump. Failures are the writer's business; the handler
    /// carries on with the configured follow-up either way.
    fn persist(&mut self, frame: &ExceptionFrame, target: DumpTarget);
}

/// Interactive debug protocol handler.
pub trait DebugStub {
    /// Take over the faulting CPU. Never returns.
    fn enter(&mut self, frame: &ExceptionFrame) -> !;
}

/// How an incident ends, once the diagnostics are out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Terminal {
    /// Software reset after the drain delay.
    Reset,
    /// Spin with the watchdogs off.
    Halt,
    /// Hand the frame to the debug stub.
    EnterDebugStub,
}

/// Result of processing one fault entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// A debugger is attached and has been given control; return to the
    /// faulting context.
    ResumedForDebugger,
    /// The common handler ran; finish with this action.
    Terminal(Terminal),
}
