//! Processor state saved on every interrupt entry.

use core::mem::{offset_of, size_of};

use super::vectors::Vector;

/// Snapshot built on the interrupt stack by the vector stubs.
///
/// Lowest address first. The general-purpose registers are pushed by the
/// shared stub tail (RAX first, so R15 ends up at offset 0). `vector` and
/// `error_code` are pushed by the per-vector stub; stubs for vectors without a
/// hardware error code push 0. Everything from `rip` on is pushed by the
/// processor.
///
/// A frame only lives for one dispatch call and is never kept.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrapFrame {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rbp: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
    pub vector: u64,
    pub error_code: u64,
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

/// Bytes the stubs push, hardware part included.
pub const TRAP_FRAME_SIZE: usize = 22 * 8;

/// Start of the part pushed before the shared tail runs: vector, error code
/// and the processor's interrupt frame.
pub const ENTRY_FRAME_OFFSET: usize = offset_of!(TrapFrame, vector);

// Offsets the stub assembly relies on
const _: () = {
    assert!(size_of::<TrapFrame>() == TRAP_FRAME_SIZE);
    assert!(offset_of!(TrapFrame, r15) == 0);
    assert!(offset_of!(TrapFrame, rax) == 14 * 8);
    assert!(offset_of!(TrapFrame, vector) == 15 * 8);
    assert!(offset_of!(TrapFrame, error_code) == 16 * 8);
    assert!(offset_of!(TrapFrame, rip) == 17 * 8);
    assert!(offset_of!(TrapFrame, ss) == 21 * 8);
    // keeps RSP 16-byte aligned at the dispatch call
    assert!(TRAP_FRAME_SIZE % 16 == 0);
};

impl TrapFrame {
    /// The populated vector this frame was built for, if any.
    pub fn vector(&self) -> Option<Vector> {
        Vector::from_number(self.vector)
    }

    /// Whether the interrupted code ran in ring 0.
    pub fn from_kernel(&self) -> bool {
        self.cs & 0b11 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_vector_decodes() {
        let frame = TrapFrame {
            vector: 14,
            error_code: 0b10,
            ..TrapFrame::default()
        };
        assert_eq!(frame.vector(), Some(Vector::PageFault));
        assert_eq!(TrapFrame { vector: 9, ..frame }.vector(), None);
    }

    #[test]
    fn privilege_comes_from_saved_cs() {
        let kernel = TrapFrame { cs: 0x08, ..TrapFrame::default() };
        let user = TrapFrame { cs: 0x1B, ..TrapFrame::default() };
        assert!(kernel.from_kernel());
        assert!(!user.from_kernel());
    }
}
