//! # Framebuffer
//!
//! Pixel access to the framebuffer handed over by the bootloader, used by
//! the console to paint its character grid.

pub mod framebuffer;

pub use framebuffer::{FramebufferWriter, GLYPH_HEIGHT, GLYPH_WIDTH};
