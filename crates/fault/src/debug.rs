//! Hardware debug controller: instruction breakpoints and data watchpoints.
//!
//! # Watchpoint control encoding
//!
//! `DBREAKCn[5:0]` is a mask applied to the low address bits before the
//! comparison, so a run of ones from bit 5 down to bit `log2(size)` watches a
//! naturally aligned `size`-byte region:
//!
//! | Size | Mask   |
//! |------|--------|
//! | 1    | `0x3F` |
//! | 2    | `0x3E` |
//! | 4    | `0x3C` |
//! | ...  | ...    |
//! | 64   | `0x00` |
//!
//! Bits 30 and 31 select load and store triggering; every other bit is
//! reserved. A control value of zero triggers on neither, i.e. disabled.

use bitflags::bitflags;
use platform::{CpuControl, SpecialRegister};

/// Largest watchable region in bytes.
pub const MAX_WATCH_SIZE: u32 = 64;

/// Mask bits of `DBREAKCn`.
pub const DBREAKC_MASK: u32 = 0x3F;

bitflags! {
    /// Access types a watchpoint triggers on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WatchpointFlags: u32 {
        /// Trigger on loads.
        const LOAD = 1 << 30;
        /// Trigger on stores.
        const STORE = 1 << 31;
    }
}

/// Which watchpoint argument was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchpointArgument {
    /// Slot outside {0, 1}.
    InvalidSlot,
    /// Size not a power of two in 1..=64.
    InvalidSize,
    /// Flags outside the load/store bits.
    ReservedFlags,
}

/// Watchpoint configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchpointError {
    /// A parameter is out of range. No hardware state was changed.
    InvalidArgument(WatchpointArgument),
}

#[cfg(feature = "std")]
impl std::error::Error for WatchpointError {}

impl core::fmt::Display for WatchpointError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidArgument(WatchpointArgument::InvalidSlot) => {
                write!(f, "invalid argument: watchpoint slot must be 0 or 1")
            }
            Self::InvalidArgument(WatchpointArgument::InvalidSize) => {
                write!(f, "invalid argument: watch size must be a power of two from 1 to 64")
            }
            Self::InvalidArgument(WatchpointArgument::ReservedFlags) => {
                write!(f, "invalid argument: watchpoint flags use reserved bits")
            }
        }
    }
}

/// A validated watchpoint, ready to be written to the debug unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchpointConfig {
    slot: usize,
    address: u32,
    size: u32,
    flags: WatchpointFlags,
}

impl WatchpointConfig {
    /// Validate a watchpoint request.
    ///
    /// # Errors
    ///
    /// - [`WatchpointArgument::InvalidSlot`] if `slot` is not 0 or 1
    /// - [`WatchpointArgument::ReservedFlags`] if `flags` has bits other than
    ///   [`WatchpointFlags::LOAD`] / [`WatchpointFlags::STORE`]
    /// - [`WatchpointArgument::InvalidSize`] if `size` is not 1, 2, 4, ..., 64
    pub fn new(slot: usize, address: u32, size: u32, flags: u32) -> Result<Self, WatchpointError> {
        if SpecialRegister::dbreak_control(slot).is_none() {
            return Err(WatchpointError::InvalidArgument(WatchpointArgument::InvalidSlot));
        }
        let Some(flags) = WatchpointFlags::from_bits(flags) else {
            return Err(WatchpointError::InvalidArgument(WatchpointArgument::ReservedFlags));
        };
        if !size.is_power_of_two() || size > MAX_WATCH_SIZE {
            return Err(WatchpointError::InvalidArgument(WatchpointArgument::InvalidSize));
        }
        Ok(Self {
            slot,
            address,
            size,
            flags,
        })
    }

    /// Watchpoint slot (0 or 1).
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Watched address.
    pub fn address(&self) -> u32 {
        self.address
    }

    /// Watched region size in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// `DBREAKCn` value: size mask OR'd with the access flags.
    pub fn control(&self) -> u32 {
        let mask = DBREAKC_MASK.wrapping_shl(self.size.trailing_zeros()) & DBREAKC_MASK;
        mask | self.flags.bits()
    }
}

/// Region size in bytes encoded by a `DBREAKCn` value.
pub fn watched_size(control: u32) -> u32 {
    let mask = control & DBREAKC_MASK;
    // A mask of k trailing zeros inside the 6-bit field watches 2^k bytes.
    1u32.wrapping_shl((mask | !DBREAKC_MASK).trailing_zeros().min(6))
}

/// Whether a `DBREAKCn` value can trigger at all.
pub fn watchpoint_enabled(control: u32) -> bool {
    WatchpointFlags::from_bits_truncate(control) != WatchpointFlags::empty()
}

/// Point instruction breakpoint 0 at `address` and enable it.
///
/// The enable mask is read-modify-written so breakpoint 1 is left alone.
pub fn set_instruction_breakpoint<C: CpuControl>(cpu: &mut C, address: u32) {
    cpu.write_special(SpecialRegister::IBreakA0, address);
    let enable = cpu.read_special(SpecialRegister::IBreakEnable);
    cpu.write_special(SpecialRegister::IBreakEnable, enable | 1);
    trace!("ibreak0 armed at {=u32:#x}", address);
}

/// Program data watchpoint `slot`.
///
/// Re-setting a slot overwrites its previous configuration.
///
/// # Errors
///
/// [`WatchpointError::InvalidArgument`] for a bad slot, size or flag value;
/// nothing is written in that case.
pub fn set_watchpoint<C: CpuControl>(
    cpu: &mut C,
    slot: usize,
    address: u32,
    size: u32,
    flags: u32,
) -> Result<(), WatchpointError> {
    let config = match WatchpointConfig::new(slot, address, size, flags) {
        Ok(config) => config,
        Err(e) => {
            warn!("watchpoint {} rejected: {}", slot, e);
            return Err(e);
        }
    };
    apply_watchpoint(cpu, &config);
    Ok(())
}

/// Write a validated watchpoint to the debug unit.
pub fn apply_watchpoint<C: CpuControl>(cpu: &mut C, config: &WatchpointConfig) {
    let (Some(addr_reg), Some(ctrl_reg)) = (
        SpecialRegister::dbreak_address(config.slot),
        SpecialRegister::dbreak_control(config.slot),
    ) else {
        return;
    };
    cpu.write_special(addr_reg, config.address);
    cpu.write_special(ctrl_reg, config.control());
    debug!(
        "watchpoint {} at {=u32:#x} size {} control {=u32:#x}",
        config.slot,
        config.address,
        config.size,
        config.control()
    );
}

/// Disable data watchpoint `slot` by zeroing its control register.
///
/// Slots other than 0 and 1 do not exist; clearing one is a no-op.
pub fn clear_watchpoint<C: CpuControl>(cpu: &mut C, slot: usize) {
    if let Some(ctrl_reg) = SpecialRegister::dbreak_control(slot) {
        cpu.write_special(ctrl_reg, 0);
    }
}

/// Arm instruction breakpoint 0 at `address`, but only if a JTAG adapter is
/// attached. Without one this does nothing at all.
pub fn arm_breakpoint_if_debugger_attached<C: CpuControl>(cpu: &mut C, address: u32) {
    if cpu.debugger_attached() {
        set_instruction_breakpoint(cpu, address);
    }
}
