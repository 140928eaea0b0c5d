//! # Console
//!
//! Line-oriented text output for the kernel. Every line lands in an 80×25
//! [`TextGrid`](grid::TextGrid), is painted onto the framebuffer when one is
//! attached, and is mirrored to COM1.
//!
//! The console is a single global behind a spin lock. Interrupt handlers do
//! not log; only the panic path writes from interrupt context, and it takes
//! the lock with [`lock_for_panic`], which breaks a lock held by the code it
//! interrupted.

pub mod color;
pub mod grid;

use spin::{Mutex, MutexGuard};

use crate::framebuffer::FramebufferWriter;
use crate::klog::{LogRecord, LogSink, LINE_CAPACITY};
use color::Style;
use grid::{TextGrid, COLUMNS, ROWS};

pub struct Console {
    grid: TextGrid,
    display: Option<FramebufferWriter>,
    serial_mirror: bool,
}

pub static CONSOLE: Mutex<Console> = Mutex::new(Console::new());

impl Console {
    pub(crate) const fn new() -> Self {
        Self {
            grid: TextGrid::new(),
            display: None,
            serial_mirror: false,
        }
    }

    pub fn grid(&self) -> &TextGrid {
        &self.grid
    }

    pub fn attach_display(&mut self, mut display: FramebufferWriter) {
        display.clear(Style::Normal.colors().1);
        self.display = Some(display);
        // repaint whatever was logged before the framebuffer existed
        self.render_rows(u32::MAX);
    }

    pub fn set_serial_mirror(&mut self, enabled: bool) {
        self.serial_mirror = enabled;
    }

    /// Write `text` followed by a newline.
    pub fn write_line(&mut self, style: Style, text: &str) {
        self.grid.write_str(text, style);
        self.grid.write_byte(b'\n', style);
        if self.serial_mirror {
            crate::serial::write_line(text);
        }
        self.flush();
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.flush();
    }

    fn flush(&mut self) {
        let dirty = self.grid.take_dirty();
        if dirty != 0 {
            self.render_rows(dirty);
        }
    }

    fn render_rows(&mut self, mask: u32) {
        let Some(display) = self.display.as_mut() else {
            return;
        };
        for row in (0..ROWS).filter(|row| mask & (1 << row) != 0) {
            let cells = self.grid.row(row);
            for (column, cell) in cells.iter().enumerate().take(COLUMNS) {
                let (fg, bg) = cell.style.colors();
                display.draw_cell(column, row, cell.byte, fg, bg);
            }
        }
    }
}

impl LogSink for Console {
    fn write_record(&mut self, record: &LogRecord<'_>) {
        let mut buf = [0u8; LINE_CAPACITY];
        let text = record.render(&mut buf);
        self.write_line(Style::from(record.level), text);
    }
}

/// Route the console to the framebuffer and COM1.
pub fn init(display: Option<FramebufferWriter>) {
    let mut console = CONSOLE.lock();
    console.set_serial_mirror(true);
    if let Some(display) = display {
        console.attach_display(display);
    }
}

/// Lock the console from the panic path.
///
/// A panic can interrupt code that holds the console lock. The panic path
/// never returns to that code, so the lock is broken instead of waited on.
pub fn lock_for_panic() -> MutexGuard<'static, Console> {
    if let Some(guard) = CONSOLE.try_lock() {
        return guard;
    }
    // Safety: the holder was interrupted and will never run again
    unsafe { CONSOLE.force_unlock() };
    CONSOLE.lock()
}
