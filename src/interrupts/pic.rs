//! # Programmable Interrupt Controller (8259 PIC)
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │   PIC 1     │     │   PIC 2     │
//! │  (Primary)  │◀────│ (Secondary) │
//! │ IRQ 0-7     │     │ IRQ 8-15    │
//! └─────────────┘     └─────────────┘
//!       │
//!       ▼
//!     CPU
//! ```
//!
//! Both chips are remapped off the exception range (primary to 32-39,
//! secondary to 40-47) and every line except IRQ0 is masked. IRQ7 still
//! arrives as the primary chip's spurious signal.

use pic8259::ChainedPics;
use spin::Mutex;
use x86_64::instructions::port::Port;

use super::dispatch::InterruptController;
use super::vectors::Vector;

pub const PIC_1_OFFSET: u8 = 32; // Primary PIC handles IRQs 0-7
pub const PIC_2_OFFSET: u8 = 40; // Secondary PIC handles IRQs 8-15

const PIC_1_COMMAND: u16 = 0x20;
/// OCW3: next read of the command port returns the in-service register.
const OCW3_READ_ISR: u8 = 0x0B;

/// Only IRQ0 (timer) unmasked on the primary chip.
const PRIMARY_MASK: u8 = !0x01;
const SECONDARY_MASK: u8 = 0xFF;

/// IRQ7 bit of the primary in-service register.
pub const IRQ7_IN_SERVICE: u8 = 1 << 7;

pub struct Pic8259 {
    pics: ChainedPics,
    command: Port<u8>,
}

impl Pic8259 {
    /// # Safety
    /// The caller must own the legacy PIC ports.
    pub const unsafe fn new() -> Self {
        Self {
            pics: unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) },
            command: Port::new(PIC_1_COMMAND),
        }
    }

    /// Remap both chips and mask every line except the timer.
    ///
    /// # Safety
    /// Must run with interrupts disabled, before they are first enabled.
    pub unsafe fn initialize(&mut self) {
        unsafe {
            self.pics.initialize();
            self.pics.write_masks(PRIMARY_MASK, SECONDARY_MASK);
        }
    }

    pub fn masks(&mut self) -> [u8; 2] {
        unsafe { self.pics.read_masks() }
    }
}

impl InterruptController for Pic8259 {
    fn signal_end_of_interrupt(&mut self, vector: Vector) {
        unsafe { self.pics.notify_end_of_interrupt(vector.number()) }
    }

    fn read_in_service_register(&mut self) -> u8 {
        unsafe {
            self.command.write(OCW3_READ_ISR);
            self.command.read()
        }
    }
}

pub static PICS: Mutex<Pic8259> = Mutex::new(unsafe { Pic8259::new() });
