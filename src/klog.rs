//! # Kernel Log Records
//!
//! A record is a severity tag plus formatted text. Records are rendered into
//! a stack buffer and handed to a [`LogSink`] immediately; nothing is kept.
//!
//! ```ignore
//! kinfo!("IDT loaded at {:#x}", base);
//! kwarn!("no framebuffer, serial only");
//! ```

use core::fmt;

use crate::format::format_to;

/// Longest rendered record, tag included. Longer text is truncated.
pub const LINE_CAPACITY: usize = 160;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    pub const fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One log line waiting to be rendered.
#[derive(Clone, Copy)]
pub struct LogRecord<'a> {
    pub level: Level,
    pub args: fmt::Arguments<'a>,
}

impl<'a> LogRecord<'a> {
    pub fn new(level: Level, args: fmt::Arguments<'a>) -> Self {
        Self { level, args }
    }

    /// Render as `[LEVEL] text` into `buf`.
    pub fn render<'b>(&self, buf: &'b mut [u8]) -> &'b str {
        format_to(buf, format_args!("[{}] {}", self.level, self.args))
    }
}

/// Anything that can take a finished log record.
pub trait LogSink {
    fn write_record(&mut self, record: &LogRecord<'_>);
}

/// Emit one record to `sink`.
pub fn emit<S: LogSink + ?Sized>(sink: &mut S, level: Level, args: fmt::Arguments<'_>) {
    sink.write_record(&LogRecord::new(level, args));
}

/// Emit one record to the global console.
pub fn log(level: Level, args: fmt::Arguments<'_>) {
    let mut console = crate::console::CONSOLE.lock();
    emit(&mut *console, level, args);
}

#[macro_export]
macro_rules! klog {
    ($level:expr, $($arg:tt)*) => {
        $crate::klog::log($level, core::format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::Level::Info, $($arg)*) };
}

#[macro_export]
macro_rules! kwarn {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::Level::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => { $crate::klog!($crate::klog::Level::Error, $($arg)*) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    #[test]
    fn record_renders_with_level_tag() {
        let mut buf = [0u8; LINE_CAPACITY];
        let rendered = LogRecord::new(Level::Panic, format_args!("vector {}", 13)).render(&mut buf);
        assert_eq!(rendered, "[PANIC] vector 13");
    }

    #[test]
    fn long_records_are_cut_to_capacity() {
        let mut buf = [0u8; LINE_CAPACITY];
        let long = [b'x'; 400];
        let text = core::str::from_utf8(&long).unwrap();
        let rendered = LogRecord::new(Level::Info, format_args!("{}", text)).render(&mut buf);
        assert_eq!(rendered.len(), LINE_CAPACITY);
        assert!(rendered.starts_with("[INFO] xxx"));

        let mut sink = RecordingSink::default();
        emit(&mut sink, Level::Warn, format_args!("{}", text));
        assert_eq!(sink.lines[0].len(), LINE_CAPACITY);
        assert!(sink.lines[0].starts_with("[WARN] xxx"));
    }

    #[test]
    fn emit_hands_records_to_sink_in_order() {
        let mut sink = RecordingSink::default();
        emit(&mut sink, Level::Warn, format_args!("first"));
        emit(&mut sink, Level::Error, format_args!("second"));
        assert_eq!(sink.lines, ["[WARN] first", "[ERROR] second"]);
        assert_eq!(sink.levels, [Level::Warn, Level::Error]);
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(Level::Info < Level::Warn);
        assert!(Level::Error < Level::Panic);
    }
}
