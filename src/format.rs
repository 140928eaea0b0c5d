// Fixed-buffer formatting for paths that must not allocate.
use core::fmt::{self, Write};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// A fixed-size buffer you can write formatted strings into.
///
/// Output that does not fit is cut at the last whole character and the
/// buffer is marked truncated. Writing never fails, so a diagnostic line is
/// always emitted even when its arguments are longer than expected.
pub struct FmtBuf<'a> {
    buf: &'a mut [u8],
    pos: usize,
    truncated: bool,
}

impl<'a> FmtBuf<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        FmtBuf {
            buf,
            pos: 0,
            truncated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        // Safety: write_str only copies whole UTF-8 characters
        unsafe { core::str::from_utf8_unchecked(&self.buf[..self.pos]) }
    }

    pub fn into_str(self) -> &'a str {
        let FmtBuf { buf, pos, .. } = self;
        // Safety: see `as_str`
        unsafe { core::str::from_utf8_unchecked(&buf[..pos]) }
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<'a> Write for FmtBuf<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.pos;
        let mut take = s.len().min(room);
        if take < s.len() {
            self.truncated = true;
            while !s.is_char_boundary(take) {
                take -= 1;
            }
        }
        self.buf[self.pos..self.pos + take].copy_from_slice(&s.as_bytes()[..take]);
        self.pos += take;
        Ok(())
    }
}

/// `format`-like function that renders into `buf` and returns the text.
pub fn format_to<'a>(buf: &'a mut [u8], args: fmt::Arguments<'_>) -> &'a str {
    let mut f = FmtBuf::new(buf);
    // FmtBuf never reports an error; a failing Display impl just ends the text early
    let _ = f.write_fmt(args);
    f.into_str()
}

/// Two uppercase hexadecimal digits for `byte`.
pub const fn hex_byte(byte: u8) -> [u8; 2] {
    [
        HEX_DIGITS[(byte >> 4) as usize],
        HEX_DIGITS[(byte & 0x0F) as usize],
    ]
}

#[macro_export]
macro_rules! format_no_std {
    ($buf:expr, $($arg:tt)*) => {
        $crate::format::format_to($buf, core::format_args!($($arg)*))
    };
}
