//! Fixed-size character grid with a write cursor.
//!
//! Text wraps at [`COLUMNS`]. When the cursor would move past the last row,
//! every row moves up by one, the top row is discarded and the bottom row is
//! blanked. Rows touched since the last [`TextGrid::take_dirty`] are tracked
//! so a renderer only redraws what changed.

use super::color::Style;

pub const COLUMNS: usize = 80;
pub const ROWS: usize = 25;

/// Shown in place of bytes outside printable ASCII.
const REPLACEMENT: u8 = 0xFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub byte: u8,
    pub style: Style,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        byte: b' ',
        style: Style::Normal,
    };
}

pub struct TextGrid {
    cells: [[Cell; COLUMNS]; ROWS],
    column: usize,
    row: usize,
    // One bit per row
    dirty: u32,
}

const ALL_ROWS: u32 = (1 << ROWS) - 1;

impl TextGrid {
    pub const fn new() -> Self {
        Self {
            cells: [[Cell::BLANK; COLUMNS]; ROWS],
            column: 0,
            row: 0,
            dirty: ALL_ROWS,
        }
    }

    /// (column, row) of the next cell to be written.
    pub fn cursor(&self) -> (usize, usize) {
        (self.column, self.row)
    }

    pub fn row(&self, row: usize) -> &[Cell; COLUMNS] {
        &self.cells[row]
    }

    pub fn write_str(&mut self, text: &str, style: Style) {
        for byte in text.bytes() {
            self.write_byte(byte, style);
        }
    }

    pub fn write_byte(&mut self, byte: u8, style: Style) {
        match byte {
            b'\n' => self.new_line(),
            b'\r' => self.column = 0,
            0x20..=0x7E => self.put(byte, style),
            _ => self.put(REPLACEMENT, style),
        }
    }

    fn put(&mut self, byte: u8, style: Style) {
        if self.column >= COLUMNS {
            self.new_line();
        }
        self.cells[self.row][self.column] = Cell { byte, style };
        self.dirty |= 1 << self.row;
        self.column += 1;
    }

    fn new_line(&mut self) {
        self.column = 0;
        if self.row + 1 < ROWS {
            self.row += 1;
        } else {
            self.scroll_up();
        }
    }

    fn scroll_up(&mut self) {
        self.cells.copy_within(1.., 0);
        self.cells[ROWS - 1] = [Cell::BLANK; COLUMNS];
        self.dirty = ALL_ROWS;
    }

    pub fn clear(&mut self) {
        self.cells = [[Cell::BLANK; COLUMNS]; ROWS];
        self.column = 0;
        self.row = 0;
        self.dirty = ALL_ROWS;
    }

    /// Bitmask of rows changed since the previous call.
    pub fn take_dirty(&mut self) -> u32 {
        core::mem::take(&mut self.dirty)
    }
}

impl Default for TextGrid {
    fn default() -> Self {
        Self::new()
    }
}
