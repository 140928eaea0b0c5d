//! Framebuffer writer using embedded-graphics
use bootloader_api::info::{FrameBuffer, PixelFormat};
use embedded_graphics::{
    mono_font::{ascii::FONT_8X13, MonoTextStyleBuilder},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use crate::console::color::Color;

pub const GLYPH_WIDTH: usize = 8;
pub const GLYPH_HEIGHT: usize = 13;

pub struct FramebufferWriter {
    framebuffer: &'static mut [u8],
    pub width: usize,
    pub height: usize,
    pub stride: usize,
    pub bytes_per_pixel: usize,
    pixel_format: PixelFormat,
}

impl FramebufferWriter {
    pub fn new(fb: &'static mut FrameBuffer) -> Self {
        let info = fb.info();

        Self {
            framebuffer: fb.buffer_mut(),
            width: info.width,
            height: info.height,
            stride: info.stride,
            bytes_per_pixel: info.bytes_per_pixel,
            pixel_format: info.pixel_format,
        }
    }

    /// Fill entire screen with a color
    pub fn clear(&mut self, color: Color) {
        self.fill_rect(0, 0, self.width as u32, self.height as u32, color);
    }

    /// Fill a rectangular region
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        let rect = Rectangle::new(Point::new(x, y), Size::new(width, height));
        rect.into_styled(PrimitiveStyle::with_fill(color.to_rgb888()))
            .draw(self)
            .ok();
    }

    /// Paint one grid cell: background box, then the glyph on top
    pub fn draw_cell(&mut self, column: usize, row: usize, byte: u8, fg: Color, bg: Color) {
        let x = (column * GLYPH_WIDTH) as i32;
        let y = (row * GLYPH_HEIGHT) as i32;
        self.fill_rect(x, y, GLYPH_WIDTH as u32, GLYPH_HEIGHT as u32, bg);

        let style = MonoTextStyleBuilder::new()
            .font(&FONT_8X13)
            .text_color(fg.to_rgb888())
            .build();
        let glyph = [byte];
        // the grid's replacement byte is not UTF-8
        let text = core::str::from_utf8(&glyph).unwrap_or("?");
        Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(self)
            .ok();
    }
}

// Implement DrawTarget for embedded-graphics
impl DrawTarget for FramebufferWriter {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(Point { x, y }, color) in pixels {
            if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
                continue;
            }

            let offset = (y as usize * self.stride + x as usize) * self.bytes_per_pixel;
            if offset + self.bytes_per_pixel > self.framebuffer.len() {
                continue;
            }
            let pixel = &mut self.framebuffer[offset..offset + self.bytes_per_pixel];
            match self.pixel_format {
                PixelFormat::Rgb => {
                    pixel[0] = color.r();
                    pixel[1] = color.g();
                    pixel[2] = color.b();
                }
                PixelFormat::U8 => {
                    pixel[0] = ((color.r() as u16 + color.g() as u16 + color.b() as u16) / 3) as u8;
                }
                _ => {
                    pixel[0] = color.b();
                    pixel[1] = color.g();
                    pixel[2] = color.r();
                }
            }
        }
        Ok(())
    }
}

impl OriginDimensions for FramebufferWriter {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}
