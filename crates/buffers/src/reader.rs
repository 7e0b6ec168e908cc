//! Bounds-checked binary reader with cursor tracking.

use std::str;

use crate::BufferError;

/// Cursor over a borrowed byte slice. Multi-byte integers are big-endian.
///
/// Every read checks the remaining length and fails with
/// [`BufferError::EndOfBuffer`] instead of panicking.
///
/// # Example
///
/// ```
/// use dynrec_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = Reader::new(&data);
/// assert_eq!(reader.u8().unwrap(), 0x01);
/// assert_eq!(reader.u16().unwrap(), 0x0203);
/// assert!(reader.u8().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    x: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, x: 0 }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.x
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.x
    }

    pub fn is_at_end(&self) -> bool {
        self.x >= self.data.len()
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let bytes = self.buf(N)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(bytes);
        Ok(arr)
    }

    pub fn peek(&self) -> Result<u8, BufferError> {
        self.data.get(self.x).copied().ok_or(BufferError::EndOfBuffer)
    }

    /// Returns the next `size` bytes and advances past them.
    pub fn buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        if size > self.remaining() {
            return Err(BufferError::EndOfBuffer);
        }
        let start = self.x;
        self.x += size;
        Ok(&self.data[start..self.x])
    }

    pub fn utf8(&mut self, size: usize) -> Result<&'a str, BufferError> {
        let bytes = self.buf(size)?;
        str::from_utf8(bytes).map_err(|_| BufferError::InvalidUtf8)
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        let val = self.peek()?;
        self.x += 1;
        Ok(val)
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8, BufferError> {
        self.u8().map(|b| b as i8)
    }

    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.take().map(u16::from_be_bytes)
    }

    #[inline]
    pub fn i16(&mut self) -> Result<i16, BufferError> {
        self.take().map(i16::from_be_bytes)
    }

    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.take().map(u32::from_be_bytes)
    }

    #[inline]
    pub fn i32(&mut self) -> Result<i32, BufferError> {
        self.take().map(i32::from_be_bytes)
    }

    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.take().map(u64::from_be_bytes)
    }

    #[inline]
    pub fn i64(&mut self) -> Result<i64, BufferError> {
        self.take().map(i64::from_be_bytes)
    }

    #[inline]
    pub fn f32(&mut self) -> Result<f32, BufferError> {
        self.take().map(f32::from_be_bytes)
    }

    #[inline]
    pub fn f64(&mut self) -> Result<f64, BufferError> {
        self.take().map(f64::from_be_bytes)
    }
}
