//! Little-endian buffer reader with cursor tracking.

use std::str;

use crate::BufferError;

/// A binary buffer reader over a borrowed byte slice.
///
/// The reader keeps a cursor position. Every read is bounds checked and
/// reports [`BufferError::EndOfBuffer`] instead of panicking, so it is safe to
/// point at untrusted input. All multi-byte values are little-endian.
///
/// # Example
///
/// ```
/// use tree_ensemble_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::new(&data);
///
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0302);
/// assert!(reader.u16().is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    data: &'a [u8],
    x: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, x: 0 }
    }

    /// Creates a reader positioned at `x`. The position is not checked until
    /// the first read.
    pub fn at(data: &'a [u8], x: usize) -> Self {
        Self { data, x }
    }

    /// The underlying byte slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Moves the cursor to an absolute position.
    pub fn seek(&mut self, x: usize) {
        self.x = x;
    }

    /// Returns the number of bytes between the cursor and the end.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.x)
    }

    /// Advances the cursor by the given number of bytes.
    pub fn skip(&mut self, length: usize) -> Result<(), BufferError> {
        self.buf(length).map(|_| ())
    }

    /// Peeks at the current byte without advancing the cursor.
    pub fn peek(&self) -> Result<u8, BufferError> {
        self.data.get(self.x).copied().ok_or(BufferError::EndOfBuffer {
            offset: self.x,
            len: 1,
            size: self.data.len(),
        })
    }

    /// Returns a subslice of the given size and advances the cursor.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        let x = self.x;
        let bin = x
            .checked_add(size)
            .and_then(|end| self.data.get(x..end))
            .ok_or(BufferError::EndOfBuffer {
                offset: x,
                len: size,
                size: self.data.len(),
            })?;
        self.x = x + size;
        Ok(bin)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.buf(N)?);
        Ok(out)
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        let val = self.peek()?;
        self.x += 1;
        Ok(val)
    }

    /// Reads an unsigned 16-bit integer.
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.array().map(u16::from_le_bytes)
    }

    /// Reads an unsigned 32-bit integer.
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.array().map(u32::from_le_bytes)
    }

    /// Reads an unsigned 64-bit integer.
    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.array().map(u64::from_le_bytes)
    }

    /// Reads a 32-bit floating point number.
    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        self.array().map(f32::from_le_bytes)
    }

    /// Reads a 64-bit floating point number.
    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        self.array().map(f64::from_le_bytes)
    }

    /// Reads an unsigned integer stored in `width` bytes (1, 2, 4 or 8).
    pub fn uint(&mut self, width: usize) -> Result<u64, BufferError> {
        match width {
            1 => self.u8().map(u64::from),
            2 => self.u16().map(u64::from),
            4 => self.u32().map(u64::from),
            8 => self.u64(),
            _ => Err(BufferError::InvalidWidth(width)),
        }
    }

    /// Reads a two's complement signed integer stored in `width` bytes.
    pub fn int(&mut self, width: usize) -> Result<i64, BufferError> {
        match width {
            1 => self.array().map(i8::from_le_bytes).map(i64::from),
            2 => self.array().map(i16::from_le_bytes).map(i64::from),
            4 => self.array().map(i32::from_le_bytes).map(i64::from),
            8 => self.array().map(i64::from_le_bytes),
            _ => Err(BufferError::InvalidWidth(width)),
        }
    }

    /// Reads an IEEE 754 float stored in `width` bytes (4 or 8).
    pub fn float(&mut self, width: usize) -> Result<f64, BufferError> {
        match width {
            4 => self.f32().map(f64::from),
            8 => self.f64(),
            _ => Err(BufferError::InvalidWidth(width)),
        }
    }

    /// Reads bytes up to a NUL terminator and moves the cursor past it.
    pub fn until_nul(&mut self) -> Result<&'a [u8], BufferError> {
        let start = self.x;
        let rest = self.data.get(start..).ok_or(BufferError::EndOfBuffer {
            offset: start,
            len: 1,
            size: self.data.len(),
        })?;
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(BufferError::Unterminated(start))?;
        self.x = start + len + 1;
        Ok(&rest[..len])
    }

    /// Reads a UTF-8 string of the given size.
    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let bytes = self.buf(size)?;
        str::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u8(), Ok(0x01));
        assert_eq!(reader.u8(), Ok(0x02));
        assert_eq!(reader.u8(), Ok(0x03));
        assert!(reader.u8().is_err());
    }

    #[test]
    fn test_u16_is_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u16(), Ok(0x0201));
        assert_eq!(reader.u16(), Ok(0x0403));
    }

    #[test]
    fn test_u32() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.u32(), Ok(0x04030201));
    }

    #[test]
    fn test_short_read_does_not_advance() {
        let data = [0x01, 0x02, 0x03];
        let mut reader = Reader::new(&data);
        reader.skip(2).unwrap();
        assert_eq!(
            reader.u16(),
            Err(BufferError::EndOfBuffer {
                offset: 2,
                len: 2,
                size: 3
            })
        );
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.u8(), Ok(0x03));
    }

    #[test]
    fn test_variable_width() {
        let data = [0xff, 0xff, 0x00, 0x00];
        assert_eq!(Reader::new(&data).uint(1), Ok(0xff));
        assert_eq!(Reader::new(&data).uint(2), Ok(0xffff));
        assert_eq!(Reader::new(&data).int(2), Ok(-1));
        assert_eq!(Reader::new(&data).int(4), Ok(0xffff));
        assert_eq!(
            Reader::new(&data).uint(3),
            Err(BufferError::InvalidWidth(3))
        );
        assert!(Reader::new(&data).uint(8).is_err());
    }

    #[test]
    fn test_until_nul() {
        let data = b"abc\0de";
        let mut reader = Reader::new(data);
        assert_eq!(reader.until_nul(), Ok(&b"abc"[..]));
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.until_nul(), Err(BufferError::Unterminated(4)));
    }

    #[test]
    fn test_seek_past_end() {
        let data = [0u8; 4];
        let mut reader = Reader::at(&data, usize::MAX);
        assert!(reader.u8().is_err());
        assert!(reader.buf(2).is_err());
        assert!(reader.until_nul().is_err());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_utf8() {
        let data = b"hello world";
        let mut reader = Reader::new(data);
        assert_eq!(reader.utf8(5), Ok("hello"));
        assert_eq!(reader.utf8(6), Ok(" world"));
        let bad = [0xc3, 0x28];
        assert_eq!(Reader::new(&bad).utf8(2), Err(BufferError::InvalidUtf8));
    }
}
