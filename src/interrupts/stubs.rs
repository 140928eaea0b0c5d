//! Vector entry stubs.
//!
//! One stub per populated vector. A stub makes the stack look the same for
//! every vector (placeholder error code where the processor pushes none, then
//! the vector number) and jumps to the shared tail, which saves the
//! general-purpose registers into a [`TrapFrame`](super::frame::TrapFrame),
//! calls dispatch with its address, restores the registers and returns with
//! `iretq`.

use core::arch::global_asm;

use super::dispatch::trap_entry;
use super::vectors::Vector;

global_asm!(
    r#"
.macro TRAP_STUB_NOERR vector
    .global trap_vector_\vector
trap_vector_\vector:
    push 0
    push \vector
    jmp trap_common
.endm

.macro TRAP_STUB_ERR vector
    .global trap_vector_\vector
trap_vector_\vector:
    push \vector
    jmp trap_common
.endm

.text
TRAP_STUB_NOERR 0
TRAP_STUB_NOERR 1
TRAP_STUB_NOERR 2
TRAP_STUB_NOERR 3
TRAP_STUB_NOERR 4
TRAP_STUB_NOERR 5
TRAP_STUB_NOERR 6
TRAP_STUB_NOERR 7
TRAP_STUB_ERR   8
TRAP_STUB_ERR   10
TRAP_STUB_ERR   11
TRAP_STUB_ERR   12
TRAP_STUB_ERR   13
TRAP_STUB_ERR   14
TRAP_STUB_NOERR 16
TRAP_STUB_ERR   17
TRAP_STUB_NOERR 18
TRAP_STUB_NOERR 19
TRAP_STUB_NOERR 32
TRAP_STUB_NOERR 39

trap_common:
    push rax
    push rbx
    push rcx
    push rdx
    push rsi
    push rdi
    push rbp
    push r8
    push r9
    push r10
    push r11
    push r12
    push r13
    push r14
    push r15
    mov rdi, rsp
    call {dispatch}
    pop r15
    pop r14
    pop r13
    pop r12
    pop r11
    pop r10
    pop r9
    pop r8
    pop rbp
    pop rdi
    pop rsi
    pop rdx
    pop rcx
    pop rbx
    pop rax
    add rsp, 16
    iretq
"#,
    dispatch = sym trap_entry,
);

extern "C" {
    fn trap_vector_0();
    fn trap_vector_1();
    fn trap_vector_2();
    fn trap_vector_3();
    fn trap_vector_4();
    fn trap_vector_5();
    fn trap_vector_6();
    fn trap_vector_7();
    fn trap_vector_8();
    fn trap_vector_10();
    fn trap_vector_11();
    fn trap_vector_12();
    fn trap_vector_13();
    fn trap_vector_14();
    fn trap_vector_16();
    fn trap_vector_17();
    fn trap_vector_18();
    fn trap_vector_19();
    fn trap_vector_32();
    fn trap_vector_39();
}

/// Entry point of one vector. Never called from Rust; only its address is used.
#[derive(Clone, Copy)]
pub struct VectorStub {
    pub vector: Vector,
    entry: unsafe extern "C" fn(),
}

impl VectorStub {
    pub fn address(&self) -> u64 {
        self.entry as usize as u64
    }
}

macro_rules! stubs {
    ($($vector:ident => $entry:ident),* $(,)?) => {
        [$(VectorStub { vector: Vector::$vector, entry: $entry }),*]
    };
}

/// One stub per entry of [`Vector::ALL`], same order.
pub static VECTOR_STUBS: [VectorStub; Vector::ALL.len()] = stubs![
    DivideError => trap_vector_0,
    Debug => trap_vector_1,
    NonMaskable => trap_vector_2,
    Breakpoint => trap_vector_3,
    Overflow => trap_vector_4,
    BoundRange => trap_vector_5,
    InvalidOpcode => trap_vector_6,
    DeviceNotAvailable => trap_vector_7,
    DoubleFault => trap_vector_8,
    InvalidTss => trap_vector_10,
    SegmentNotPresent => trap_vector_11,
    StackSegmentFault => trap_vector_12,
    GeneralProtection => trap_vector_13,
    PageFault => trap_vector_14,
    X87FloatingPoint => trap_vector_16,
    AlignmentCheck => trap_vector_17,
    MachineCheck => trap_vector_18,
    SimdFloatingPoint => trap_vector_19,
    Timer => trap_vector_32,
    Irq7 => trap_vector_39,
];
