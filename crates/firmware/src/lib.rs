//! ESP32 fault-handler integration
//!
//! Binds the target-independent [`fault`] crate to the ESP32: register-level
//! implementations of the `platform` traits, the C-ABI entry points the
//! runtime jumps to, and Cargo-feature selection of the recovery action.
//!
//! # Architecture
//!
//! ```text
//! Exception vectors / libc / scheduler
//!         ↓
//! exception_handlers (C ABI)
//!         ↓
//! fault::FaultHandler
//!         ↓
//! hal (UART0, TIMG, RTC_CNTL, special registers)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for `xtensa-esp32-none-elf` (inline asm, MMIO)
//! - `recovery-*` - Recovery action, see [`config`]
//! - `diagnostics-off` - Suppress all UART output
//! - `stack-canary-watchpoint` - Report watchpoint 1 as a stack-canary hit
//! - `std` - Enable standard library (host testing)
//!
//! # Hardware Target
//!
//! ```bash
//! cargo +esp build --release --target xtensa-esp32-none-elf --features hardware
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![cfg_attr(feature = "hardware", feature(asm_experimental_arch))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)]
#![warn(clippy::dbg_macro)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
// Register and pointer widths are 32 bits on the target.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod exception_handlers;
pub mod hal;

pub use config::{FeatureSelection, FAULT_CONFIG};

/// Log the fault configuration this image was built with.
pub fn report_configuration() {
    #[cfg(feature = "defmt")]
    defmt::info!(
        "fault handler: recovery={} diagnostics={} canary_watchpoint={}",
        FAULT_CONFIG.recovery.name(),
        FAULT_CONFIG.effective_diagnostics(),
        FAULT_CONFIG.stack_canary_watchpoint
    );
}
