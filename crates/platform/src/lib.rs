//! Hardware Abstraction Layer (HAL) for the dual-core fault handler
//!
//! This crate provides trait-based abstractions for every piece of hardware
//! the fault handler touches, so that the classification, unwinding and
//! rendering logic can be developed and tested without an ESP32 attached.
//!
//! # Architecture Layers
//!
//! ```text
//! Trap vectors (firmware crate, C ABI)
//!         ↓
//! Fault core (fault crate: dispatch, unwind, dump, recovery)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (special registers + MMIO, firmware::hal)
//! ```
//!
//! # Abstractions
//!
//! - [`TxFifo`] - UART0 transmit FIFO used by the raw diagnostic channel
//! - [`CpuControl`] - Special registers, core identity, core stall, OCD status
//! - [`WatchdogRegisters`] - Timer-group watchdog register file
//! - [`WordReader`] - Word-granular reads used while walking the stack
//! - [`SystemControl`] - Busy-wait delay and whole-chip software reset
//!
//! # Features
//!
//! - `std`: Expose [`mocks`] to other crates' tests
//! - `defmt`: Enable defmt::Format derives

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
#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors: callers decide
#![allow(clippy::module_name_repetitions)]

pub mod console;
pub mod cpu;
pub mod memory;
pub mod mocks;
pub mod system;
pub mod watchdog;

pub use console::TxFifo;
pub use cpu::{CoreId, CpuControl, SpecialRegister};
pub use memory::WordReader;
pub use system::SystemControl;
pub use watchdog::{TimerGroup, WatchdogRegisters, WdtRegister};
