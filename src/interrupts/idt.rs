//! # Interrupt Descriptor Table
//!
//! 256 gate descriptors, one slot per vector number. Only the vectors in
//! [`Vector::ALL`] get a descriptor; every other slot stays zero (not
//! present).
//!
//! ```text
//! Offset  Size  Field
//! 0       2     handler address bits 0-15
//! 2       2     code segment selector (0x08)
//! 4       1     IST index, always 0
//! 5       1     type/attributes (0x8E)
//! 6       2     handler address bits 16-31
//! 8       4     handler address bits 32-63
//! 12      4     reserved, 0
//! ```
//!
//! The table is built once, on first use, and never changes afterwards.
//! [`initialize`] loads it; loading it again is harmless.

use core::mem::{offset_of, size_of};

use spin::Lazy;
use x86_64::instructions::tables::{lidt, sidt};
use x86_64::structures::DescriptorTablePointer;
use x86_64::VirtAddr;

use super::stubs::VECTOR_STUBS;
use super::vectors::{GATE_ATTRIBUTES, IDT_SLOTS, KERNEL_CODE_SELECTOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct IdtEntry {
    offset_low: u16,
    selector: u16,
    ist: u8,
    attributes: u8,
    offset_mid: u16,
    offset_high: u32,
    reserved: u32,
}

const _: () = {
    assert!(size_of::<IdtEntry>() == 16);
    assert!(offset_of!(IdtEntry, selector) == 2);
    assert!(offset_of!(IdtEntry, ist) == 4);
    assert!(offset_of!(IdtEntry, attributes) == 5);
    assert!(offset_of!(IdtEntry, offset_mid) == 6);
    assert!(offset_of!(IdtEntry, offset_high) == 8);
    assert!(offset_of!(IdtEntry, reserved) == 12);
};

impl IdtEntry {
    /// Not present. The processor never dispatches through it.
    pub const MISSING: Self = Self {
        offset_low: 0,
        selector: 0,
        ist: 0,
        attributes: 0,
        offset_mid: 0,
        offset_high: 0,
        reserved: 0,
    };

    /// Present ring-0 interrupt gate to `handler` in the kernel code segment.
    pub const fn interrupt_gate(handler: u64) -> Self {
        Self {
            offset_low: handler as u16,
            selector: KERNEL_CODE_SELECTOR,
            ist: 0,
            attributes: GATE_ATTRIBUTES,
            offset_mid: (handler >> 16) as u16,
            offset_high: (handler >> 32) as u32,
            reserved: 0,
        }
    }

    pub const fn handler_address(&self) -> u64 {
        self.offset_low as u64 | (self.offset_mid as u64) << 16 | (self.offset_high as u64) << 32
    }

    pub const fn selector(&self) -> u16 {
        self.selector
    }

    pub const fn attributes(&self) -> u8 {
        self.attributes
    }

    pub const fn is_present(&self) -> bool {
        self.attributes & 0x80 != 0
    }

    /// The sixteen bytes the processor reads.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0..2].copy_from_slice(&self.offset_low.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.selector.to_le_bytes());
        bytes[4] = self.ist;
        bytes[5] = self.attributes;
        bytes[6..8].copy_from_slice(&self.offset_mid.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.offset_high.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.reserved.to_le_bytes());
        bytes
    }
}

/// The Interrupt Descriptor Table. Only [`table`] hands one out.
#[repr(C, align(16))]
pub struct InterruptDescriptorTable {
    entries: [IdtEntry; IDT_SLOTS],
}

/// `lidt` limit: table size in bytes, minus one.
pub const IDT_LIMIT: u16 = (IDT_SLOTS * size_of::<IdtEntry>() - 1) as u16;

impl InterruptDescriptorTable {
    fn build() -> Self {
        let mut entries = [IdtEntry::MISSING; IDT_SLOTS];
        for stub in VECTOR_STUBS.iter() {
            entries[stub.vector.number() as usize] = IdtEntry::interrupt_gate(stub.address());
        }
        Self { entries }
    }

    pub fn entry(&self, vector: u8) -> &IdtEntry {
        &self.entries[vector as usize]
    }

    pub fn entries(&self) -> &[IdtEntry; IDT_SLOTS] {
        &self.entries
    }

    pub fn pointer(&self) -> DescriptorTablePointer {
        DescriptorTablePointer {
            limit: IDT_LIMIT,
            base: VirtAddr::from_ptr(self.entries.as_ptr()),
        }
    }

    fn load(&'static self) {
        // Safety: the table is 'static and fully built
        unsafe { lidt(&self.pointer()) };
    }
}

static IDT: Lazy<InterruptDescriptorTable> = Lazy::new(InterruptDescriptorTable::build);

/// The kernel's table, built on first call.
pub fn table() -> &'static InterruptDescriptorTable {
    &IDT
}

/// Build the table if needed and load it into IDTR.
///
/// Call before interrupts are enabled. Calling again reloads the same table.
pub fn initialize() {
    IDT.load();
}

/// Whether IDTR currently points at the kernel's table.
pub fn is_installed() -> bool {
    same_table(&sidt(), &table().pointer())
}

fn same_table(a: &DescriptorTablePointer, b: &DescriptorTablePointer) -> bool {
    // packed struct: copy the fields out before comparing
    let (a_limit, a_base) = (a.limit, a.base);
    let (b_limit, b_base) = (b.limit, b.base);
    a_limit == b_limit && a_base == b_base
}
