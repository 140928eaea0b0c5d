//! General-purpose register snapshot and its dump.

use core::arch::asm;

use crate::format::format_to;
use crate::interrupts::frame::TrapFrame;
use crate::klog::{emit, Level, LogSink};

/// Display names, in dump order. Padded to three characters.
pub const REGISTER_NAMES: [&str; 16] = [
    "RAX", "RBX", "RCX", "RDX", "RSI", "RDI", "RBP", "RSP", "R8 ", "R9 ", "R10", "R11", "R12",
    "R13", "R14", "R15",
];

/// The sixteen general-purpose registers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rbp: u64,
    pub rsp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
}

impl RegisterSnapshot {
    /// Read the registers as they are right now.
    ///
    /// The register that carries the output pointer reads back as that
    /// pointer; everything else is the caller's live state.
    #[inline(always)]
    pub fn capture() -> Self {
        let mut values = [0u64; 16];
        unsafe {
            asm!(
                "mov [{out} + 0x00], rax",
                "mov [{out} + 0x08], rbx",
                "mov [{out} + 0x10], rcx",
                "mov [{out} + 0x18], rdx",
                "mov [{out} + 0x20], rsi",
                "mov [{out} + 0x28], rdi",
                "mov [{out} + 0x30], rbp",
                "mov [{out} + 0x38], rsp",
                "mov [{out} + 0x40], r8",
                "mov [{out} + 0x48], r9",
                "mov [{out} + 0x50], r10",
                "mov [{out} + 0x58], r11",
                "mov [{out} + 0x60], r12",
                "mov [{out} + 0x68], r13",
                "mov [{out} + 0x70], r14",
                "mov [{out} + 0x78], r15",
                out = in(reg) values.as_mut_ptr(),
                options(nostack, preserves_flags),
            );
        }
        Self::from_values(values)
    }

    /// Registers of the interrupted context. RSP is the stack pointer the
    /// processor saved, not the interrupt stack.
    pub fn from_frame(frame: &TrapFrame) -> Self {
        Self {
            rax: frame.rax,
            rbx: frame.rbx,
            rcx: frame.rcx,
            rdx: frame.rdx,
            rsi: frame.rsi,
            rdi: frame.rdi,
            rbp: frame.rbp,
            rsp: frame.rsp,
            r8: frame.r8,
            r9: frame.r9,
            r10: frame.r10,
            r11: frame.r11,
            r12: frame.r12,
            r13: frame.r13,
            r14: frame.r14,
            r15: frame.r15,
        }
    }

    pub fn from_values(v: [u64; 16]) -> Self {
        Self {
            rax: v[0],
            rbx: v[1],
            rcx: v[2],
            rdx: v[3],
            rsi: v[4],
            rdi: v[5],
            rbp: v[6],
            rsp: v[7],
            r8: v[8],
            r9: v[9],
            r10: v[10],
            r11: v[11],
            r12: v[12],
            r13: v[13],
            r14: v[14],
            r15: v[15],
        }
    }

    /// Values in [`REGISTER_NAMES`] order.
    pub fn values(&self) -> [u64; 16] {
        [
            self.rax, self.rbx, self.rcx, self.rdx, self.rsi, self.rdi, self.rbp, self.rsp,
            self.r8, self.r9, self.r10, self.r11, self.r12, self.r13, self.r14, self.r15,
        ]
    }
}

/// `RAX: 0x0000000000000000`
pub fn render_register<'b>(name: &str, value: u64, buf: &'b mut [u8]) -> &'b str {
    format_to(buf, format_args!("{}: 0x{:016X}", name, value))
}

/// Registers printed per dump line.
pub const REGISTERS_PER_LINE: usize = 2;

/// `Register Dump:` followed by eight lines of two registers each, so a
/// whole report fits on one console screen.
pub fn dump_registers<S: LogSink + ?Sized>(sink: &mut S, registers: &RegisterSnapshot) {
    emit(sink, Level::Info, format_args!("Register Dump:"));
    let values = registers.values();
    let names = REGISTER_NAMES.chunks_exact(REGISTERS_PER_LINE);
    for (names, values) in names.zip(values.chunks_exact(REGISTERS_PER_LINE)) {
        let mut left = [0u8; 32];
        let mut right = [0u8; 32];
        emit(
            sink,
            Level::Info,
            format_args!(
                "{}  {}",
                render_register(names[0], values[0], &mut left),
                render_register(names[1], values[1], &mut right)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    fn hex_field(line: &str) -> &str {
        line.rsplit("0x").next().unwrap()
    }

    /// The digits after every `0x` on a dump line.
    fn hex_fields(line: &str) -> std::vec::Vec<&str> {
        line.split("0x")
            .skip(1)
            .map(|field| field.split(' ').next().unwrap())
            .collect()
    }

    #[test]
    fn every_register_is_sixteen_hex_digits() {
        for value in [0, 1, 0xDEAD_BEEF, u64::MAX] {
            let mut buf = [0u8; 32];
            let line = render_register("RAX", value, &mut buf);
            let digits = hex_field(line);
            assert_eq!(digits.len(), 16, "{}", line);
            assert!(digits.bytes().all(|b| b.is_ascii_hexdigit()));
            assert_eq!(u64::from_str_radix(digits, 16).unwrap(), value);
        }
    }

    #[test]
    fn dump_lists_sixteen_registers_in_order() {
        let regs = RegisterSnapshot::from_values(core::array::from_fn(|i| i as u64 * 0x11));
        let mut sink = RecordingSink::default();
        dump_registers(&mut sink, &regs);

        assert_eq!(sink.lines.len(), 1 + 16 / REGISTERS_PER_LINE);
        assert_eq!(sink.lines[0], "[INFO] Register Dump:");
        assert_eq!(
            sink.lines[1],
            "[INFO] RAX: 0x0000000000000000  RBX: 0x0000000000000011"
        );
        assert_eq!(
            sink.lines[4],
            "[INFO] RBP: 0x0000000000000066  RSP: 0x0000000000000077"
        );
        assert_eq!(
            sink.lines[8],
            "[INFO] R14: 0x00000000000000EE  R15: 0x00000000000000FF"
        );

        let fields: std::vec::Vec<&str> =
            sink.lines[1..].iter().flat_map(|l| hex_fields(l)).collect();
        assert_eq!(fields.len(), 16);
        for (i, field) in fields.iter().enumerate() {
            assert_eq!(field.len(), 16);
            assert_eq!(u64::from_str_radix(field, 16).unwrap(), i as u64 * 0x11);
        }
    }

    #[test]
    fn all_ones_and_zero_keep_width() {
        let regs = RegisterSnapshot::from_values([u64::MAX; 16]);
        let mut sink = RecordingSink::default();
        dump_registers(&mut sink, &regs);
        for line in &sink.lines[1..] {
            assert_eq!(hex_fields(line), ["FFFFFFFFFFFFFFFF"; 2]);
        }

        let mut sink = RecordingSink::default();
        dump_registers(&mut sink, &RegisterSnapshot::default());
        for line in &sink.lines[1..] {
            assert_eq!(hex_fields(line), ["0000000000000000"; 2]);
        }
    }

    #[test]
    fn dump_lines_fit_the_console_width() {
        let regs = RegisterSnapshot::from_values([u64::MAX; 16]);
        let mut sink = RecordingSink::default();
        dump_registers(&mut sink, &regs);
        assert!(sink.lines.iter().all(|l| l.len() <= crate::console::grid::COLUMNS));
    }

    #[test]
    fn frame_registers_use_saved_stack_pointer() {
        let frame = TrapFrame {
            rax: 1,
            r15: 15,
            rsp: 0xFFFF_8000_0000_1000,
            ..TrapFrame::default()
        };
        let regs = RegisterSnapshot::from_frame(&frame);
        assert_eq!(regs.rax, 1);
        assert_eq!(regs.r15, 15);
        assert_eq!(regs.rsp, 0xFFFF_8000_0000_1000);
    }

    #[test]
    fn live_capture_sees_a_stack() {
        let regs = RegisterSnapshot::capture();
        assert_ne!(regs.rsp, 0);
    }
}
