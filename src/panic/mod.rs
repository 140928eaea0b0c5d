//! # Panic Path
//!
//! Every fatal condition ends here: a failed `kassert!`, a Rust panic, or an
//! exception vector firing. The report goes out in this order:
//!
//! 1. banner
//! 2. message, with the source location or the faulting RIP
//! 3. register dump (16 registers, 16 hex digits each)
//! 4. optional memory dump, 16 bytes per line
//!
//! and then interrupts are disabled and the processor halts for good.
//!
//! Nothing on this path allocates or recurses. It formats into stack buffers
//! and only reads state that is already known to be valid.
//!
//! ```text
//! Running ──(kassert fails | exception)──▶ Reporting ──▶ Halted
//! ```

pub mod memory;
pub mod registers;

use core::fmt;
use core::panic::{Location, PanicInfo};

use x86_64::instructions::{hlt, interrupts};

use crate::console::{self, Console};
use crate::interrupts::dispatch::FatalHandler;
use crate::interrupts::frame::{TrapFrame, ENTRY_FRAME_OFFSET, TRAP_FRAME_SIZE};
use crate::klog::{emit, Level, LogSink};
pub use memory::{dump_memory, MemoryRegion};
pub use registers::{dump_registers, RegisterSnapshot};

const RULE: &str = "------------------------------------------";

/// The terminal state of the processor.
pub trait Halt {
    fn halt(&self) -> !;
}

/// Interrupts off, then `hlt` forever. Only a reset leaves this.
pub struct CpuHalt;

impl Halt for CpuHalt {
    fn halt(&self) -> ! {
        interrupts::disable();
        loop {
            hlt();
        }
    }
}

/// What happens when an exception vector fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalPolicy {
    /// Full panic report, then halt.
    Report,
    /// Halt without touching the console, for setups where the report
    /// itself could fault.
    Spin,
}

impl FatalPolicy {
    pub const fn configured() -> Self {
        if cfg!(feature = "silent-fatal") {
            FatalPolicy::Spin
        } else {
            FatalPolicy::Report
        }
    }
}

/// State attached to a report beyond its message.
pub struct Diagnostics<'a> {
    pub registers: RegisterSnapshot,
    pub frame: Option<&'a TrapFrame>,
    pub memory: Option<MemoryRegion<'a>>,
}

/// Write the full report to `sink`, then halt.
pub fn report<S, H>(
    sink: &mut S,
    halt: &H,
    location: Option<&Location<'_>>,
    message: fmt::Arguments<'_>,
    diagnostics: &Diagnostics<'_>,
) -> !
where
    S: LogSink + ?Sized,
    H: Halt + ?Sized,
{
    emit(sink, Level::Panic, format_args!("{}", RULE));
    emit(sink, Level::Panic, format_args!("                 PANIC"));
    emit(sink, Level::Panic, format_args!("{}", RULE));

    match location {
        Some(location) => emit(
            sink,
            Level::Panic,
            format_args!("{} at {}:{}", message, location.file(), location.line()),
        ),
        None => emit(sink, Level::Panic, message),
    }

    if let Some(frame) = diagnostics.frame {
        emit(
            sink,
            Level::Panic,
            format_args!(
                "error code 0x{:X} RIP 0x{:016X} CS 0x{:X} RFLAGS 0x{:X}",
                frame.error_code, frame.rip, frame.cs, frame.rflags
            ),
        );
        emit(
            sink,
            Level::Panic,
            format_args!(
                "RSP 0x{:016X} SS 0x{:X} ({} mode)",
                frame.rsp,
                frame.ss,
                if frame.from_kernel() { "kernel" } else { "user" }
            ),
        );
    }

    dump_registers(sink, &diagnostics.registers);

    if let Some(region) = &diagnostics.memory {
        dump_memory(sink, region);
    }

    halt.halt()
}

/// Report an exception taken through `frame`, then halt.
pub fn report_exception<S, H>(sink: &mut S, halt: &H, frame: &TrapFrame) -> !
where
    S: LogSink + ?Sized,
    H: Halt + ?Sized,
{
    // the saved registers are already in the register dump
    let memory = if cfg!(feature = "dump-frame-memory") {
        let start = frame as *const TrapFrame as usize + ENTRY_FRAME_OFFSET;
        // Safety: the range is the tail of `*frame`, borrowed for the whole report
        Some(unsafe { MemoryRegion::new(start, TRAP_FRAME_SIZE - ENTRY_FRAME_OFFSET) })
    } else {
        None
    };
    let diagnostics = Diagnostics {
        registers: RegisterSnapshot::from_frame(frame),
        frame: Some(frame),
        memory,
    };
    let name = frame.vector().map_or("unknown vector", |v| v.name());
    report(
        sink,
        halt,
        None,
        format_args!("Unhandled exception #{} ({})", frame.vector, name),
        &diagnostics,
    )
}

/// Clear the console and report an exception taken through `frame` on it.
///
/// The report is the only thing left on screen when the processor halts.
pub fn report_exception_on_console<H>(console: &mut Console, halt: &H, frame: &TrapFrame) -> !
where
    H: Halt + ?Sized,
{
    console.clear();
    report_exception(console, halt, frame)
}

/// Report to the console and halt the processor.
pub fn report_failure(
    location: &Location<'_>,
    message: fmt::Arguments<'_>,
    registers: RegisterSnapshot,
    memory: Option<MemoryRegion<'_>>,
) -> ! {
    interrupts::disable();
    let mut console = console::lock_for_panic();
    console.clear();
    let diagnostics = Diagnostics {
        registers,
        frame: None,
        memory,
    };
    report(&mut *console, &CpuHalt, Some(location), message, &diagnostics)
}

/// Target of `kassert!`.
#[cold]
#[track_caller]
pub fn assertion_failed(condition: &str, detail: Option<fmt::Arguments<'_>>) -> ! {
    let registers = RegisterSnapshot::capture();
    let location = Location::caller();
    match detail {
        Some(detail) => report_failure(
            location,
            format_args!("Assertion Failed: {} ({})", condition, detail),
            registers,
            None,
        ),
        None => report_failure(
            location,
            format_args!("Assertion Failed: {}", condition),
            registers,
            None,
        ),
    }
}

/// Body of the kernel's `#[panic_handler]`.
pub fn handle_panic(info: &PanicInfo<'_>) -> ! {
    let registers = RegisterSnapshot::capture();
    let location = info.location().unwrap_or_else(|| Location::caller());
    report_failure(location, format_args!("{}", info.message()), registers, None)
}

/// The fatal handler dispatch uses in the running kernel.
pub struct PanicPath {
    policy: FatalPolicy,
}

impl PanicPath {
    pub const fn new(policy: FatalPolicy) -> Self {
        Self { policy }
    }

    pub const fn configured() -> Self {
        Self::new(FatalPolicy::configured())
    }
}

impl FatalHandler for PanicPath {
    fn unhandled(&self, frame: &TrapFrame) -> ! {
        match self.policy {
            FatalPolicy::Spin => CpuHalt.halt(),
            FatalPolicy::Report => {
                let mut console = console::lock_for_panic();
                report_exception_on_console(&mut console, &CpuHalt, frame)
            }
        }
    }
}

/// Halt through the panic path when `cond` is false.
///
/// ```ignore
/// kassert!(table.entry(32).is_present());
/// kassert!(ticks > 0, "timer never fired after {} spins", spins);
/// ```
#[macro_export]
macro_rules! kassert {
    ($cond:expr $(,)?) => {
        if !$cond {
            $crate::panic::assertion_failed(core::stringify!($cond), None)
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::panic::assertion_failed(
                core::stringify!($cond),
                Some(core::format_args!($($arg)+)),
            )
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{expect_halt, RecordingSink, UnwindingHalt};

    #[test]
    fn report_order_is_banner_message_registers() {
        let mut sink = RecordingSink::default();
        let diagnostics = Diagnostics {
            registers: RegisterSnapshot::default(),
            frame: None,
            memory: None,
        };
        let location = Location::caller();

        expect_halt(|| {
            report(
                &mut sink,
                &UnwindingHalt,
                Some(location),
                format_args!("Assertion Failed: {}", "ready"),
                &diagnostics,
            )
        });

        assert_eq!(sink.lines[0], std::format!("[PANIC] {}", RULE));
        assert_eq!(sink.lines[1], "[PANIC]                  PANIC");
        assert_eq!(sink.lines[2], std::format!("[PANIC] {}", RULE));
        assert_eq!(
            sink.lines[3],
            std::format!(
                "[PANIC] Assertion Failed: ready at {}:{}",
                location.file(),
                location.line()
            )
        );
        assert_eq!(sink.lines[4], "[INFO] Register Dump:");
        // banner, message, header and 8 register lines; no memory dump
        assert_eq!(sink.lines.len(), 4 + 1 + 8);
    }

    #[test]
    fn optional_memory_dump_comes_last() {
        let data = [0xAAu8; 20];
        let mut sink = RecordingSink::default();
        let diagnostics = Diagnostics {
            registers: RegisterSnapshot::default(),
            frame: None,
            memory: Some(MemoryRegion::of(&data)),
        };

        expect_halt(|| {
            report(&mut sink, &UnwindingHalt, None, format_args!("boom"), &diagnostics)
        });

        let n = sink.lines.len();
        assert!(sink.lines[n - 3].contains("Memory Dump"));
        assert!(sink.lines[n - 2].ends_with(&"AA ".repeat(16)[..47]));
        assert_eq!(sink.lines[n - 1], "[INFO] AA AA AA AA");
    }

    #[test]
    fn exception_report_names_vector_and_context() {
        let frame = TrapFrame {
            vector: 14,
            error_code: 0x2,
            rip: 0xFFFF_FFFF_8000_1234,
            rax: 0xDEAD,
            ..TrapFrame::default()
        };
        let mut sink = RecordingSink::default();

        expect_halt(|| report_exception(&mut sink, &UnwindingHalt, &frame));

        assert!(sink.levels.contains(&Level::Panic));
        assert!(sink
            .lines
            .iter()
            .any(|l| l == "[PANIC] Unhandled exception #14 (Page Fault)"));
        assert!(sink
            .lines
            .iter()
            .any(|l| l.contains("error code 0x2 RIP 0xFFFFFFFF80001234")));
        assert!(sink.lines.iter().any(|l| l.ends_with("(kernel mode)")));
        assert!(sink
            .lines
            .iter()
            .any(|l| l.starts_with("[INFO] RAX: 0x000000000000DEAD  RBX: ")));
    }

    #[test]
    fn unknown_vector_is_still_reported() {
        let frame = TrapFrame {
            vector: 77,
            ..TrapFrame::default()
        };
        let mut sink = RecordingSink::default();
        expect_halt(|| report_exception(&mut sink, &UnwindingHalt, &frame));
        assert!(sink.lines.iter().any(|l| l.contains("#77 (unknown vector)")));
    }

    #[cfg(feature = "dump-frame-memory")]
    #[test]
    fn exception_report_dumps_the_entry_frame() {
        let frame = TrapFrame {
            vector: 0x0D,
            error_code: 0x18,
            rip: 0x1122_3344_5566_7788,
            ..TrapFrame::default()
        };
        let mut sink = RecordingSink::default();
        expect_halt(|| report_exception(&mut sink, &UnwindingHalt, &frame));

        let header = sink
            .lines
            .iter()
            .position(|l| l.contains("Memory Dump"))
            .unwrap();
        assert!(sink.lines[header].contains("(Size: 56 bytes)"));
        assert!(sink.lines[header].contains(&std::format!(
            "0x{:016X}",
            &frame.vector as *const u64 as usize
        )));
        // vector, error code, then RIP little-endian
        assert_eq!(
            sink.lines[header + 1],
            "[INFO] 0D 00 00 00 00 00 00 00 18 00 00 00 00 00 00 00"
        );
        assert_eq!(
            sink.lines[header + 2],
            "[INFO] 88 77 66 55 44 33 22 11 00 00 00 00 00 00 00 00"
        );
        assert_eq!(sink.lines.len(), header + 5);
    }

    fn screen_text(console: &Console) -> std::vec::Vec<std::string::String> {
        (0..crate::console::grid::ROWS)
            .map(|row| {
                console
                    .grid()
                    .row(row)
                    .iter()
                    .map(|cell| cell.byte as char)
                    .collect::<std::string::String>()
                    .trim_end()
                    .into()
            })
            .collect()
    }

    #[test]
    fn exception_report_stays_on_one_screen() {
        let mut console = Console::new();
        for line in 0..40 {
            emit(&mut console, Level::Info, format_args!("boot log line {}", line));
        }
        let frame = TrapFrame {
            vector: 7,
            rax: 0xDEAD,
            ..TrapFrame::default()
        };

        expect_halt(|| report_exception_on_console(&mut console, &UnwindingHalt, &frame));

        let screen = screen_text(&console);
        assert_eq!(screen[0], std::format!("[PANIC] {}", RULE));
        assert!(screen.iter().any(|row| row.ends_with(" PANIC")));
        assert!(screen
            .iter()
            .any(|row| row == "[PANIC] Unhandled exception #7 (Device Not Available)"));
        assert!(screen.iter().any(|row| row.contains("RAX: 0x000000000000DEAD")));
        assert!(screen.iter().any(|row| row.contains("R15: 0x")));
        assert!(!screen.iter().any(|row| row.contains("boot log")));
    }

    #[test]
    fn default_policy_reports() {
        if cfg!(feature = "silent-fatal") {
            assert_eq!(FatalPolicy::configured(), FatalPolicy::Spin);
        } else {
            assert_eq!(FatalPolicy::configured(), FatalPolicy::Report);
        }
    }
}
