//! Interrupt dispatch.
//!
//! | Vector       | Action                                              |
//! |--------------|-----------------------------------------------------|
//! | 32 (timer)   | end-of-interrupt, return                            |
//! | 39 (IRQ7)    | end-of-interrupt only if IRQ7 is really in service  |
//! | exceptions   | fatal, never returns                                |
//!
//! A spurious IRQ7 must not be acknowledged: the EOI would retire whatever
//! real interrupt is in service instead.

use core::sync::atomic::{AtomicU64, Ordering};

use spin::Mutex;

use super::frame::TrapFrame;
use super::pic::{IRQ7_IN_SERVICE, PICS};
use super::vectors::Vector;
use crate::panic::PanicPath;

static TIMER_TICKS: AtomicU64 = AtomicU64::new(0);
static SPURIOUS_IRQ7: AtomicU64 = AtomicU64::new(0);

/// The controller operations dispatch needs.
pub trait InterruptController {
    /// Acknowledge the interrupt currently in service.
    fn signal_end_of_interrupt(&mut self, vector: Vector);
    /// Bit n set means IRQ n is in service.
    fn read_in_service_register(&mut self) -> u8;
}

/// A controller behind a lock, taken only for the duration of one call.
///
/// Exceptions can arrive while the lock is held (during PIC bring-up, or from
/// a fault on the panic path). Those never touch the controller, so they
/// never wait on the lock.
pub struct LockedController<'a, C>(pub &'a Mutex<C>);

impl<C: InterruptController> InterruptController for LockedController<'_, C> {
    fn signal_end_of_interrupt(&mut self, vector: Vector) {
        self.0.lock().signal_end_of_interrupt(vector);
    }

    fn read_in_service_register(&mut self) -> u8 {
        self.0.lock().read_in_service_register()
    }
}

/// Where unhandled vectors go.
pub trait FatalHandler {
    fn unhandled(&self, frame: &TrapFrame) -> !;
}

/// What dispatch did with an interrupt it returned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    TimerAcknowledged,
    Irq7Acknowledged,
    SpuriousIgnored,
}

pub fn dispatch<C, F>(frame: &TrapFrame, controller: &mut C, fatal: &F) -> Handled
where
    C: InterruptController + ?Sized,
    F: FatalHandler + ?Sized,
{
    match frame.vector() {
        Some(Vector::Timer) => {
            controller.signal_end_of_interrupt(Vector::Timer);
            TIMER_TICKS.fetch_add(1, Ordering::Relaxed);
            Handled::TimerAcknowledged
        }
        Some(Vector::Irq7) => {
            if controller.read_in_service_register() & IRQ7_IN_SERVICE != 0 {
                controller.signal_end_of_interrupt(Vector::Irq7);
                Handled::Irq7Acknowledged
            } else {
                SPURIOUS_IRQ7.fetch_add(1, Ordering::Relaxed);
                Handled::SpuriousIgnored
            }
        }
        Some(
            Vector::DivideError
            | Vector::Debug
            | Vector::NonMaskable
            | Vector::Breakpoint
            | Vector::Overflow
            | Vector::BoundRange
            | Vector::InvalidOpcode
            | Vector::DeviceNotAvailable
            | Vector::DoubleFault
            | Vector::InvalidTss
            | Vector::SegmentNotPresent
            | Vector::StackSegmentFault
            | Vector::GeneralProtection
            | Vector::PageFault
            | Vector::X87FloatingPoint
            | Vector::AlignmentCheck
            | Vector::MachineCheck
            | Vector::SimdFloatingPoint,
        ) => fatal.unhandled(frame),
        // no stub pushes an unpopulated number; a corrupt frame is fatal too
        None => fatal.unhandled(frame),
    }
}

/// Timer interrupts acknowledged since boot.
pub fn ticks() -> u64 {
    TIMER_TICKS.load(Ordering::Relaxed)
}

/// IRQ7 signals dropped as spurious since boot.
pub fn spurious_count() -> u64 {
    SPURIOUS_IRQ7.load(Ordering::Relaxed)
}

/// Called by the shared stub tail with the frame it just built.
pub(super) extern "C" fn trap_entry(frame: &mut TrapFrame) {
    dispatch(frame, &mut LockedController(&PICS), &PanicPath::configured());
}
