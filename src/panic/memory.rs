//! Hex dump of a memory region.

use core::marker::PhantomData;
use core::ptr;

use crate::format::hex_byte;
use crate::klog::{emit, Level, LogSink};

pub const BYTES_PER_LINE: usize = 16;

/// "XX " per byte, without the trailing space.
pub const LINE_WIDTH: usize = BYTES_PER_LINE * 3 - 1;

/// A region the panic path may read, borrowed for `'a`.
///
/// A region built from a reference cannot outlive what it points at:
///
/// ```compile_fail
/// use early_kernel::panic::MemoryRegion;
///
/// let region = {
///     let bytes = [0u8; 4];
///     MemoryRegion::of(&bytes)
/// };
/// assert_eq!(region.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion<'a> {
    address: usize,
    length: usize,
    _bytes: PhantomData<&'a [u8]>,
}

impl<'a> MemoryRegion<'a> {
    /// # Safety
    /// `length` bytes starting at `address` must stay readable for `'a`.
    pub const unsafe fn new(address: usize, length: usize) -> Self {
        Self {
            address,
            length,
            _bytes: PhantomData,
        }
    }

    /// The bytes of `value`.
    pub fn of<T>(value: &'a T) -> Self {
        Self {
            address: value as *const T as usize,
            length: core::mem::size_of::<T>(),
            _bytes: PhantomData,
        }
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    fn read(&self, offset: usize) -> u8 {
        // Safety: `new` and `of` guarantee the region is readable
        unsafe { ptr::read_volatile((self.address + offset) as *const u8) }
    }
}

/// Render up to [`BYTES_PER_LINE`] bytes as space-separated hex pairs.
pub fn render_line<'b>(bytes: impl IntoIterator<Item = u8>, buf: &'b mut [u8; LINE_WIDTH]) -> &'b str {
    let mut len = 0;
    for (i, byte) in bytes.into_iter().take(BYTES_PER_LINE).enumerate() {
        if i > 0 {
            buf[len] = b' ';
            len += 1;
        }
        buf[len..len + 2].copy_from_slice(&hex_byte(byte));
        len += 2;
    }
    // Safety: only ASCII hex digits and spaces were written
    unsafe { core::str::from_utf8_unchecked(&buf[..len]) }
}

pub fn dump_memory<S: LogSink + ?Sized>(sink: &mut S, region: &MemoryRegion<'_>) {
    emit(
        sink,
        Level::Info,
        format_args!(
            "Memory Dump at 0x{:016X} (Size: {} bytes):",
            region.address(),
            region.len()
        ),
    );
    let mut buf = [0u8; LINE_WIDTH];
    let mut offset = 0;
    while offset < region.len() {
        let count = BYTES_PER_LINE.min(region.len() - offset);
        let line = render_line((offset..offset + count).map(|i| region.read(i)), &mut buf);
        emit(sink, Level::Info, format_args!("{}", line));
        offset += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    fn body(line: &str) -> &str {
        line.strip_prefix("[INFO] ").unwrap()
    }

    #[test]
    fn renders_pairs_separated_by_spaces() {
        let mut buf = [0u8; LINE_WIDTH];
        assert_eq!(render_line([0x00, 0x7F, 0xAB], &mut buf), "00 7F AB");
    }

    #[test]
    fn full_line_fills_buffer_exactly() {
        let mut buf = [0u8; LINE_WIDTH];
        let line = render_line(0..=255u8, &mut buf);
        assert_eq!(line.len(), LINE_WIDTH);
        assert!(line.ends_with("0E 0F"));
    }

    #[test]
    fn dump_matches_region_contents() {
        let data: [u8; 40] = core::array::from_fn(|i| (i * 7) as u8);
        let mut sink = RecordingSink::default();
        dump_memory(&mut sink, &MemoryRegion::of(&data));

        assert!(sink.lines[0].contains("(Size: 40 bytes)"));
        let rows: std::vec::Vec<&str> = sink.lines[1..].iter().map(|l| body(l)).collect();
        assert_eq!(rows.len(), 3);

        let groups: std::vec::Vec<&str> = rows.iter().flat_map(|r| r.split(' ')).collect();
        assert_eq!(groups.len(), data.len());
        for (group, byte) in groups.iter().zip(data) {
            assert_eq!(group.len(), 2);
            assert_eq!(u8::from_str_radix(group, 16).unwrap(), byte);
        }
        assert_eq!(rows[0].split(' ').count(), 16);
        assert_eq!(rows[1].split(' ').count(), 16);
        assert_eq!(rows[2].split(' ').count(), 8);
    }

    #[test]
    fn region_covers_exactly_its_value() {
        let data = [1u32, 2, 3];
        let region = MemoryRegion::of(&data);
        assert_eq!(region.address(), data.as_ptr() as usize);
        assert_eq!(region.len(), 12);
    }

    #[test]
    fn empty_region_prints_header_only() {
        let data: [u8; 0] = [];
        let mut sink = RecordingSink::default();
        dump_memory(&mut sink, &MemoryRegion::of(&data));
        assert_eq!(sink.lines.len(), 1);
    }
}
