//! The fixed vector set.
//!
//! | Vector | Name                                | Error code |
//! |--------|-------------------------------------|------------|
//! | 0-8    | #DE #DB NMI #BP #OF #BR #UD #NM #DF | #DF only   |
//! | 10-14  | #TS #NP #SS #GP #PF                 | yes        |
//! | 16-19  | #MF #AC #MC #XM                     | #AC only   |
//! | 32     | Timer (IRQ0)                        | no         |
//! | 39     | IRQ7, usually spurious              | no         |
//!
//! Every other vector number has no descriptor.

use super::pic::PIC_1_OFFSET;

/// Present, DPL 0, 64-bit interrupt gate.
pub const GATE_ATTRIBUTES: u8 = 0x8E;

/// Kernel code segment, GDT index 1.
pub const KERNEL_CODE_SELECTOR: u16 = 0x08;

/// One descriptor slot per possible vector number.
pub const IDT_SLOTS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Vector {
    DivideError = 0,
    Debug = 1,
    NonMaskable = 2,
    Breakpoint = 3,
    Overflow = 4,
    BoundRange = 5,
    InvalidOpcode = 6,
    DeviceNotAvailable = 7,
    DoubleFault = 8,
    InvalidTss = 10,
    SegmentNotPresent = 11,
    StackSegmentFault = 12,
    GeneralProtection = 13,
    PageFault = 14,
    X87FloatingPoint = 16,
    AlignmentCheck = 17,
    MachineCheck = 18,
    SimdFloatingPoint = 19,
    Timer = PIC_1_OFFSET,
    Irq7 = PIC_1_OFFSET + 7,
}

impl Vector {
    /// Every populated vector, in ascending order.
    pub const ALL: [Vector; 20] = [
        Vector::DivideError,
        Vector::Debug,
        Vector::NonMaskable,
        Vector::Breakpoint,
        Vector::Overflow,
        Vector::BoundRange,
        Vector::InvalidOpcode,
        Vector::DeviceNotAvailable,
        Vector::DoubleFault,
        Vector::InvalidTss,
        Vector::SegmentNotPresent,
        Vector::StackSegmentFault,
        Vector::GeneralProtection,
        Vector::PageFault,
        Vector::X87FloatingPoint,
        Vector::AlignmentCheck,
        Vector::MachineCheck,
        Vector::SimdFloatingPoint,
        Vector::Timer,
        Vector::Irq7,
    ];

    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Map a raw vector number (as stored in a trap frame) back to its variant.
    pub const fn from_number(number: u64) -> Option<Vector> {
        let vector = match number {
            0 => Vector::DivideError,
            1 => Vector::Debug,
            2 => Vector::NonMaskable,
            3 => Vector::Breakpoint,
            4 => Vector::Overflow,
            5 => Vector::BoundRange,
            6 => Vector::InvalidOpcode,
            7 => Vector::DeviceNotAvailable,
            8 => Vector::DoubleFault,
            10 => Vector::InvalidTss,
            11 => Vector::SegmentNotPresent,
            12 => Vector::StackSegmentFault,
            13 => Vector::GeneralProtection,
            14 => Vector::PageFault,
            16 => Vector::X87FloatingPoint,
            17 => Vector::AlignmentCheck,
            18 => Vector::MachineCheck,
            19 => Vector::SimdFloatingPoint,
            32 => Vector::Timer,
            39 => Vector::Irq7,
            _ => return None,
        };
        Some(vector)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Vector::DivideError => "Divide Error",
            Vector::Debug => "Debug",
            Vector::NonMaskable => "Non-Maskable Interrupt",
            Vector::Breakpoint => "Breakpoint",
            Vector::Overflow => "Overflow",
            Vector::BoundRange => "Bound Range Exceeded",
            Vector::InvalidOpcode => "Invalid Opcode",
            Vector::DeviceNotAvailable => "Device Not Available",
            Vector::DoubleFault => "Double Fault",
            Vector::InvalidTss => "Invalid TSS",
            Vector::SegmentNotPresent => "Segment Not Present",
            Vector::StackSegmentFault => "Stack-Segment Fault",
            Vector::GeneralProtection => "General Protection Fault",
            Vector::PageFault => "Page Fault",
            Vector::X87FloatingPoint => "x87 Floating-Point Exception",
            Vector::AlignmentCheck => "Alignment Check",
            Vector::MachineCheck => "Machine Check",
            Vector::SimdFloatingPoint => "SIMD Floating-Point Exception",
            Vector::Timer => "Timer (IRQ0)",
            Vector::Irq7 => "IRQ7",
        }
    }

    /// Whether the processor pushes an error code before entering the stub.
    pub const fn pushes_error_code(self) -> bool {
        matches!(
            self,
            Vector::DoubleFault
                | Vector::InvalidTss
                | Vector::SegmentNotPresent
                | Vector::StackSegmentFault
                | Vector::GeneralProtection
                | Vector::PageFault
                | Vector::AlignmentCheck
        )
    }

    /// Synchronous processor exception (as opposed to a PIC line).
    pub const fn is_exception(self) -> bool {
        (self as u8) < PIC_1_OFFSET
    }
}
