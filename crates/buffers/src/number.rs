//! Scalar numeric codec.
//!
//! Two encodings live here:
//!
//! - variable width: [`Int`] is stored as a minimal big-endian two's
//!   complement integer, so small magnitudes take few bytes and the sign
//!   survives the round trip;
//! - fixed width: [`Float`] and the 16/32/64-bit helpers used by
//!   [`ByteBuffer`](crate::ByteBuffer) are little-endian in both directions.

use std::fmt;

use crate::BufferError;

/// Signed integer with a variable-width byte representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Int(pub i64);

impl Int {
    /// Minimal big-endian two's complement bytes. Zero encodes as no bytes.
    ///
    /// ```
    /// use dynrec_buffers::Int;
    ///
    /// assert_eq!(Int(0).to_bytes(), Vec::<u8>::new());
    /// assert_eq!(Int(1).to_bytes(), vec![0x01]);
    /// assert_eq!(Int(255).to_bytes(), vec![0x00, 0xff]);
    /// assert_eq!(Int(-1).to_bytes(), vec![0xff]);
    /// ```
    pub fn to_bytes(self) -> Vec<u8> {
        if self.0 == 0 {
            return Vec::new();
        }
        let bytes = self.0.to_be_bytes();
        let mut start = 0;
        while start < bytes.len() - 1 {
            let sign_bit = bytes[start + 1] & 0x80;
            let redundant = (bytes[start] == 0x00 && sign_bit == 0)
                || (bytes[start] == 0xff && sign_bit != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        bytes[start..].to_vec()
    }

    /// Decodes bytes produced by [`Int::to_bytes`], sign-extending the most
    /// significant byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Int, BufferError> {
        if bytes.len() > 8 {
            return Err(BufferError::Overflow(bytes.len()));
        }
        let Some(&head) = bytes.first() else {
            return Ok(Int(0));
        };
        let fill = if head & 0x80 != 0 { 0xff } else { 0x00 };
        let mut full = [fill; 8];
        full[8 - bytes.len()..].copy_from_slice(bytes);
        Ok(Int(i64::from_be_bytes(full)))
    }

    pub fn i64(self) -> i64 {
        self.0
    }

    /// Truncating narrow conversion.
    pub fn i32(self) -> i32 {
        self.0 as i32
    }

    /// Truncating narrow conversion.
    pub fn i16(self) -> i16 {
        self.0 as i16
    }

    /// Truncating narrow conversion.
    pub fn i8(self) -> i8 {
        self.0 as i8
    }
}

impl From<i64> for Int {
    fn from(v: i64) -> Self {
        Int(v)
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// IEEE-754 double with a fixed 8-byte little-endian representation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Float(pub f64);

impl Float {
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Float, BufferError> {
        let arr: [u8; 8] = bytes.try_into().map_err(|_| BufferError::InvalidLength {
            expected: 8,
            actual: bytes.len(),
        })?;
        Ok(Float(f64::from_le_bytes(arr)))
    }

    pub fn f64(self) -> f64 {
        self.0
    }

    pub fn f32(self) -> f32 {
        self.0 as f32
    }
}

impl From<f64> for Float {
    fn from(v: f64) -> Self {
        Float(v)
    }
}

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checked `[offset, offset + width)` range of a buffer.
pub(crate) fn window(len: usize, offset: usize, width: usize) -> Result<std::ops::Range<usize>, BufferError> {
    match offset.checked_add(width) {
        Some(end) if end <= len => Ok(offset..end),
        _ => Err(BufferError::OutOfBounds { offset, width, len }),
    }
}

macro_rules! fixed_width {
    ($read:ident, $write:ident, $ty:ty) => {
        /// Reads a little-endian value at `offset`.
        pub fn $read(buf: &[u8], offset: usize) -> Result<$ty, BufferError> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            let range = window(buf.len(), offset, WIDTH)?;
            let mut arr = [0u8; WIDTH];
            arr.copy_from_slice(&buf[range]);
            Ok(<$ty>::from_le_bytes(arr))
        }

        /// Writes a little-endian value at `offset` without growing `buf`.
        pub fn $write(buf: &mut [u8], offset: usize, val: $ty) -> Result<(), BufferError> {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            let range = window(buf.len(), offset, WIDTH)?;
            buf[range].copy_from_slice(&val.to_le_bytes());
            Ok(())
        }
    };
}

fixed_width!(read_u16, write_u16, u16);
fixed_width!(read_u32, write_u32, u32);
fixed_width!(read_u64, write_u64, u64);
fixed_width!(read_i16, write_i16, i16);
fixed_width!(read_i32, write_i32, i32);
fixed_width!(read_i64, write_i64, i64);
fixed_width!(read_f64, write_f64, f64);
