//! Xtensa LX6 CPU control: special registers, core identity, stall, OCD status
//!
//! # Debug unit (Xtensa ISA §4.7)
//!
//! | Register       | SR # | Purpose                                         |
//! |----------------|------|-------------------------------------------------|
//! | `IBREAKENABLE` | 96   | Per-slot enable bits for instruction breakpoints |
//! | `IBREAKA0`     | 128  | Instruction breakpoint 0 address                |
//! | `IBREAKA1`     | 129  | Instruction breakpoint 1 address                |
//! | `DBREAKA0`     | 144  | Data watchpoint 0 address                       |
//! | `DBREAKA1`     | 145  | Data watchpoint 1 address                       |
//! | `DBREAKC0`     | 160  | Data watchpoint 0 control (mask + load/store)   |
//! | `DBREAKC1`     | 161  | Data watchpoint 1 control                       |
//! | `DEBUGCAUSE`   | 233  | Why the last debug exception fired (read-only)  |
//!
//! A `DBREAKCn` value of zero sets neither the load nor the store bit, so the
//! slot never triggers.
//!
//! # Core stall (ESP32 TRM §31, RTC_CNTL)
//!
//! Stalling a core takes two fields: `SW_STALL_<CPU>_C0` in `RTC_CNTL_OPTIONS0`
//! and `SW_STALL_<CPU>_C1` in `RTC_CNTL_SW_CPU_STALL`. Both must hold the magic
//! values below; the stall lasts until the next reset.

/// Number of instruction-breakpoint slots on the LX6 debug unit.
pub const IBREAK_SLOTS: usize = 2;

/// Number of data-watchpoint slots on the LX6 debug unit.
pub const DBREAK_SLOTS: usize = 2;

/// RTC control block base address.
pub const RTC_CNTL_BASE: u32 = 0x3FF4_8000;

/// `RTC_CNTL_OPTIONS0_REG`: holds the `_C0` half of the stall code.
pub const RTC_CNTL_OPTIONS0_REG: u32 = RTC_CNTL_BASE;

/// `RTC_CNTL_SW_CPU_STALL_REG`: holds the `_C1` half of the stall code.
pub const RTC_CNTL_SW_CPU_STALL_REG: u32 = RTC_CNTL_BASE + 0xAC;

/// `SW_STALL_APPCPU_C0` field: bits \[1:0\] of OPTIONS0.
pub const SW_STALL_APPCPU_C0_SHIFT: u32 = 0;
/// `SW_STALL_PROCPU_C0` field: bits \[3:2\] of OPTIONS0.
pub const SW_STALL_PROCPU_C0_SHIFT: u32 = 2;
/// Width mask of the `_C0` fields.
pub const SW_STALL_C0_MASK: u32 = 0x3;
/// Stall code for the `_C0` fields.
pub const SW_STALL_C0_CODE: u32 = 0x2;

/// `SW_STALL_APPCPU_C1` field: bits \[25:20\] of SW_CPU_STALL.
pub const SW_STALL_APPCPU_C1_SHIFT: u32 = 20;
/// `SW_STALL_PROCPU_C1` field: bits \[31:26\] of SW_CPU_STALL.
pub const SW_STALL_PROCPU_C1_SHIFT: u32 = 26;
/// Width mask of the `_C1` fields.
pub const SW_STALL_C1_MASK: u32 = 0x3F;
/// Stall code for the `_C1` fields.
pub const SW_STALL_C1_CODE: u32 = 0x21;

/// OCD debug status register, read with `rer`.
pub const OCD_DSR: u32 = 0x0010_200C;

/// `DSR.DebugModePowerOn`: set while a JTAG adapter holds the OCD powered.
pub const OCDDSR_DEBUGMODEPOWERON: u32 = 1 << 31;

/// One of the two ESP32 cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoreId {
    /// PRO_CPU (core 0)
    Pro,
    /// APP_CPU (core 1)
    App,
}

impl CoreId {
    /// Core number as printed in diagnostics (0 or 1).
    pub const fn index(self) -> u32 {
        match self {
            Self::Pro => 0,
            Self::App => 1,
        }
    }

    /// The core that is not `self`.
    pub const fn other(self) -> Self {
        match self {
            Self::Pro => Self::App,
            Self::App => Self::Pro,
        }
    }
}

/// Special registers the fault handler reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpecialRegister {
    /// Instruction breakpoint enable mask.
    IBreakEnable,
    /// Instruction breakpoint 0 address.
    IBreakA0,
    /// Instruction breakpoint 1 address.
    IBreakA1,
    /// Data watchpoint 0 address.
    DBreakA0,
    /// Data watchpoint 1 address.
    DBreakA1,
    /// Data watchpoint 0 control.
    DBreakC0,
    /// Data watchpoint 1 control.
    DBreakC1,
    /// Debug cause bitmask (read-only).
    DebugCause,
}

impl SpecialRegister {
    /// Number of modelled special registers.
    pub const COUNT: usize = 8;

    /// Every register, in SR-number order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::IBreakEnable,
        Self::IBreakA0,
        Self::IBreakA1,
        Self::DBreakA0,
        Self::DBreakA1,
        Self::DBreakC0,
        Self::DBreakC1,
        Self::DebugCause,
    ];

    /// Xtensa special register number.
    pub const fn number(self) -> u8 {
        match self {
            Self::IBreakEnable => 96,
            Self::IBreakA0 => 128,
            Self::IBreakA1 => 129,
            Self::DBreakA0 => 144,
            Self::DBreakA1 => 145,
            Self::DBreakC0 => 160,
            Self::DBreakC1 => 161,
            Self::DebugCause => 233,
        }
    }

    /// Address register of data watchpoint `slot`, if the slot exists.
    pub const fn dbreak_address(slot: usize) -> Option<Self> {
        match slot {
            0 => Some(Self::DBreakA0),
            1 => Some(Self::DBreakA1),
            _ => None,
        }
    }

    /// Control register of data watchpoint `slot`, if the slot exists.
    pub const fn dbreak_control(slot: usize) -> Option<Self> {
        match slot {
            0 => Some(Self::DBreakC0),
            1 => Some(Self::DBreakC1),
            _ => None,
        }
    }
}

/// Privileged CPU operations.
///
/// One implementation per target (`firmware::hal::Esp32Cpu`), one for host
/// tests (`mocks::MockCpu`). Nothing in here may allocate or fault.
pub trait CpuControl {
    /// Read a special register.
    fn read_special(&self, register: SpecialRegister) -> u32;

    /// Write a special register.
    fn write_special(&mut self, register: SpecialRegister, value: u32);

    /// The core executing this code.
    fn core_id(&self) -> CoreId;

    /// Stall `core` until the next reset.
    fn stall_core(&mut self, core: CoreId);

    /// Whether an external JTAG/OCD adapter is attached.
    fn debugger_attached(&self) -> bool;

    /// Execute `break.n 1` so an attached debugger takes over.
    fn debugger_break(&mut self);

    /// Execute `break 0,0`, re-entering the debug/panic vector.
    fn trap(&mut self);

    /// Spin forever with nothing else running.
    fn halt(&mut self) -> !;
}
