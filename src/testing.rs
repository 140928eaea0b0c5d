//! Host-side doubles for the hardware seams.

use std::panic::{self, AssertUnwindSafe};
use std::string::{String, ToString};
use std::vec::Vec;

use crate::interrupts::dispatch::InterruptController;
use crate::interrupts::vectors::Vector;
use crate::klog::{Level, LogRecord, LogSink, LINE_CAPACITY};
use crate::panic::Halt;

/// Keeps every rendered record.
#[derive(Default)]
pub struct RecordingSink {
    pub lines: Vec<String>,
    pub levels: Vec<Level>,
}

impl LogSink for RecordingSink {
    fn write_record(&mut self, record: &LogRecord<'_>) {
        let mut buf = [0u8; LINE_CAPACITY];
        self.lines.push(record.render(&mut buf).to_string());
        self.levels.push(record.level);
    }
}

/// Counts acknowledgments and answers ISR reads with a fixed value.
#[derive(Default)]
pub struct RecordingController {
    pub in_service: u8,
    pub eoi: Vec<Vector>,
    pub isr_reads: usize,
}

impl RecordingController {
    pub fn with_in_service(in_service: u8) -> Self {
        Self {
            in_service,
            ..Self::default()
        }
    }
}

impl InterruptController for RecordingController {
    fn signal_end_of_interrupt(&mut self, vector: Vector) {
        self.eoi.push(vector);
    }

    fn read_in_service_register(&mut self) -> u8 {
        self.isr_reads += 1;
        self.in_service
    }
}

/// Payload of the unwind that stands in for a halted processor.
pub struct Halted;

/// Halts by unwinding, so a test can observe that a path never returns.
pub struct UnwindingHalt;

impl Halt for UnwindingHalt {
    fn halt(&self) -> ! {
        panic::resume_unwind(Box::new(Halted))
    }
}

/// Run `f` and require that it ends in [`UnwindingHalt::halt`].
pub fn expect_halt<R>(f: impl FnOnce() -> R) {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => panic!("path returned instead of halting"),
        Err(payload) => assert!(
            payload.downcast_ref::<Halted>().is_some(),
            "path panicked for a reason other than halting"
        ),
    }
}
