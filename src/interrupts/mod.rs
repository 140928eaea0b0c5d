//! # Interrupt Handling Module
//!
//! - **GDT**: kernel code segment at selector 0x08
//! - **IDT**: 256 slots, 20 populated, one assembly stub each
//! - **PIC**: 8259 pair remapped to 32-47, only IRQ0 unmasked
//! - **Dispatch**: timer and IRQ7 handling, everything else is fatal
//!
//! ## Interrupt Vector Layout
//!
//! | Vector | Type                   | Action                        |
//! |--------|------------------------|-------------------------------|
//! | 0-19   | CPU Exceptions (no 9, 15) | panic report, halt         |
//! | 32     | Timer (IRQ0)           | EOI                           |
//! | 39     | IRQ7                   | EOI unless spurious           |
//!
//! ## Usage
//!
//! ```ignore
//! use early_kernel::interrupts;
//! interrupts::init()?; // GDT, IDT, PIC
//! x86_64::instructions::interrupts::enable();
//! ```
//!
//! Order matters: the table is fully built before it is loaded, and loaded
//! before interrupts are enabled.

pub mod dispatch;
pub mod frame;
pub mod gdt;
pub mod idt;
pub mod pic;
pub mod stubs;
pub mod vectors;

use pic::PICS;

pub fn init() -> Result<(), &'static str> {
    x86_64::instructions::interrupts::disable();
    gdt::init()?;
    idt::initialize();
    unsafe { PICS.lock().initialize() };
    Ok(())
}
