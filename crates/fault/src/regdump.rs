//! Register/frame dumper.
//!
//! Prints frame words 1..=24 as `NAME: 0xhhhhhhhh` pairs, four per line.
//! Word 0 (the exit dispatcher) is not a register and is never shown.

use platform::TxFifo;

use crate::console::Console;
use crate::frame::ExceptionFrame;

/// Names for frame words 1..=24, padded to eight columns.
///
/// An empty name hides that word but keeps its column.
pub const REGISTER_NAMES: [&str; 24] = [
    "PC      ", "PS      ", "A0      ", "A1      ",
    "A2      ", "A3      ", "A4      ", "A5      ",
    "A6      ", "A7      ", "A8      ", "A9      ",
    "A10     ", "A11     ", "A12     ", "A13     ",
    "A14     ", "A15     ", "SAR     ", "EXCCAUSE",
    "EXCVADDR", "LBEG    ", "LEND    ", "LCOUNT  ",
];

/// Registers per output line.
pub const REGISTERS_PER_LINE: usize = 4;

const LAST_COLUMN: usize = REGISTERS_PER_LINE - 1;

/// Print `Register dump:` followed by the named frame words.
pub fn print_register_dump<T: TxFifo>(console: &mut Console<T>, frame: &ExceptionFrame) {
    console.put_str("Register dump:\r\n");
    let words = frame.words();
    for (column, (name, value)) in REGISTER_NAMES
        .iter()
        .zip(words.iter().skip(1))
        .enumerate()
    {
        if !name.is_empty() {
            console.put_str(name);
            console.put_str(": 0x");
            console.put_hex(*value);
            console.put_str("  ");
        }
        if column % REGISTERS_PER_LINE == LAST_COLUMN {
            console.put_str("\r\n");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::console::DiagnosticOutput;
    use platform::mocks::MockUart;

    fn dump(frame: &ExceptionFrame) -> Console<MockUart> {
        let mut console = Console::new(MockUart::new(), DiagnosticOutput::Enabled);
        print_register_dump(&mut console, frame);
        console
    }

    #[test]
    fn test_names_are_eight_columns() {
        for name in REGISTER_NAMES {
            assert_eq!(name.len(), 8, "{name:?}");
        }
    }

    #[test]
    fn test_all_registers_printed_four_per_line() {
        let frame = ExceptionFrame::new(0x400D_1234, 0x3FFB_0000, 0x800D_0000, 28);
        let console = dump(&frame);
        let out = console.inner().output();

        for name in REGISTER_NAMES {
            assert!(out.contains(&format!("{name}: 0x")), "missing {name:?}");
        }
        let lines: Vec<&str> = out.split("\r\n").collect();
        assert_eq!(lines[0], "Register dump:");
        // Six full rows, then the empty tail after the final separator.
        assert_eq!(lines.len(), 1 + 6 + 1);
        for row in &lines[1..7] {
            assert_eq!(row.matches(": 0x").count(), 4);
        }
        assert_eq!(lines[7], "");
    }

    #[test]
    fn test_values_follow_frame_order() {
        let frame = ExceptionFrame::new(0x400D_1234, 0x3FFB_0000, 0x800D_0000, 28);
        let console = dump(&frame);
        let out = console.inner().output();
        assert!(out.starts_with("Register dump:\r\nPC      : 0x400d1234  PS      : 0x00000000  "));
        assert!(out.contains("A0      : 0x800d0000  A1      : 0x3ffb0000  \r\n"));
        assert!(out.contains("EXCCAUSE: 0x0000001c  "));
    }

    #[test]
    fn test_exit_word_not_printed() {
        let mut frame = ExceptionFrame::default();
        frame.exit = 0xCAFE_F00D;
        let console = dump(&frame);
        assert!(!console.inner().output().contains("cafef00d"));
    }
}
