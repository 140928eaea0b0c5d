//! Color representation and the console's style tags
use embedded_graphics::pixelcolor::Rgb888;

use crate::klog::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const DARK_RED: Color = Color::new(128, 0, 0);
    pub const YELLOW: Color = Color::new(255, 255, 0);
    pub const LIGHT_GRAY: Color = Color::new(192, 192, 192);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r, self.g, self.b)
    }
}

/// Color tag stored with every grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Normal,
    Warning,
    Error,
    Panic,
}

impl Style {
    /// (foreground, background)
    pub const fn colors(self) -> (Color, Color) {
        match self {
            Style::Normal => (Color::LIGHT_GRAY, Color::BLACK),
            Style::Warning => (Color::YELLOW, Color::BLACK),
            Style::Error => (Color::RED, Color::BLACK),
            Style::Panic => (Color::WHITE, Color::DARK_RED),
        }
    }
}

impl From<Level> for Style {
    fn from(level: Level) -> Self {
        match level {
            Level::Info => Style::Normal,
            Level::Warn => Style::Warning,
            Level::Error => Style::Error,
            Level::Panic => Style::Panic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_records_stand_out() {
        assert_eq!(Style::from(Level::Panic), Style::Panic);
        let (fg, bg) = Style::Panic.colors();
        assert_ne!(bg, Style::Normal.colors().1);
        assert_ne!(fg, bg);
    }
}
