//! Owned byte sequence with text-ish helpers and fixed-offset scalar access.

use std::fmt;
use std::io;
use std::ops::Deref;

use crate::number::{self, Float, Int};
use crate::{byte_size, BufferError};

/// Result of [`ByteBuffer::find`].
///
/// `start` is negative when the pattern's first byte does not occur; callers
/// must then ignore `extract`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found<'a> {
    pub start: isize,
    pub end: isize,
    pub extract: Option<&'a [u8]>,
}

impl Found<'_> {
    pub fn is_found(&self) -> bool {
        self.start >= 0
    }
}

/// An owned byte sequence.
///
/// In-place writes ([`write`](Self::write), [`write_str`](Self::write_str)
/// and the scalar writers) never change the length; [`append`](Self::append)
/// and [`join`](Self::join) build new buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteBuffer(Vec<u8>);

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer of `size` zero bytes, ready for offset writes.
    pub fn zeroed(size: usize) -> Self {
        Self(vec![0; size])
    }

    pub fn from_int(v: i64) -> Self {
        Self(Int(v).to_bytes())
    }

    pub fn from_f64(v: f64) -> Self {
        Self(Float(v).to_bytes().to_vec())
    }

    pub fn size(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    /// Content as UTF-8 text.
    pub fn as_str(&self) -> Result<&str, BufferError> {
        std::str::from_utf8(&self.0).map_err(|_| BufferError::InvalidUtf8)
    }

    pub fn contains(&self, needle: &[u8]) -> bool {
        needle.is_empty() || self.0.windows(needle.len()).any(|w| w == needle)
    }

    /// Human readable size, e.g. `1.5KB`.
    pub fn humanize(&self) -> String {
        byte_size(self.0.len() as u64)
    }

    /// Whether the content parses as a JSON document.
    pub fn is_json(&self) -> bool {
        serde_json::from_slice::<serde_json::Value>(&self.0).is_ok()
    }

    /// Splits on any of `delims`, decoding the content as UTF-8. Empty fields
    /// are dropped; invalid UTF-8 sequences never match a delimiter.
    ///
    /// ```
    /// use dynrec_buffers::ByteBuffer;
    ///
    /// let parts = ByteBuffer::from("a,b;;c").split(&[',', ';']);
    /// assert_eq!(parts, vec!["a".into(), "b".into(), ByteBuffer::from("c")]);
    /// ```
    pub fn split(&self, delims: &[char]) -> Vec<ByteBuffer> {
        let mut fields = Vec::new();
        let mut field_start: Option<usize> = None;
        let mut pos = 0;
        for chunk in self.0.utf8_chunks() {
            for (i, c) in chunk.valid().char_indices() {
                let at = pos + i;
                if delims.contains(&c) {
                    if let Some(start) = field_start.take() {
                        fields.push(ByteBuffer(self.0[start..at].to_vec()));
                    }
                } else if field_start.is_none() {
                    field_start = Some(at);
                }
            }
            pos += chunk.valid().len();
            if !chunk.invalid().is_empty() {
                field_start.get_or_insert(pos);
                pos += chunk.invalid().len();
            }
        }
        if let Some(start) = field_start {
            fields.push(ByteBuffer(self.0[start..].to_vec()));
        }
        fields
    }

    /// Concatenates `parts`, writing a delimiter after each one. Part `i`
    /// uses `delims[i]`; once the list runs out the last delimiter repeats.
    ///
    /// ```
    /// use dynrec_buffers::ByteBuffer;
    ///
    /// let joined = ByteBuffer::join(&["a", "b", "c"], &[':', ',']);
    /// assert_eq!(joined, ByteBuffer::from("a:b,c,"));
    /// ```
    pub fn join<B: AsRef<[u8]>>(parts: &[B], delims: &[char]) -> ByteBuffer {
        let mut out = Vec::new();
        let mut scratch = [0u8; 4];
        for (x, part) in parts.iter().enumerate() {
            out.extend_from_slice(part.as_ref());
            if let Some(delim) = delims.get(x).or(delims.last()) {
                out.extend_from_slice(delim.encode_utf8(&mut scratch).as_bytes());
            }
        }
        ByteBuffer(out)
    }

    /// Locates the first occurrence of `pattern[0]` and reports the
    /// `pattern.len()` bytes starting there. Only the first byte anchors the
    /// match; the remaining bytes are not compared.
    pub fn find(&self, pattern: &[u8]) -> Found<'_> {
        let len = pattern.len() as isize;
        let pos = pattern
            .first()
            .and_then(|anchor| self.0.iter().position(|b| b == anchor));
        match pos {
            Some(pos) => {
                let end = pos + pattern.len();
                Found {
                    start: pos as isize,
                    end: end as isize,
                    extract: self.0.get(pos..end),
                }
            }
            None => Found {
                start: -1,
                end: len - 1,
                extract: None,
            },
        }
    }

    /// Copies `value` into the front of the buffer, truncating to the current
    /// length. Returns the number of bytes copied.
    pub fn write(&mut self, value: &[u8]) -> usize {
        let n = value.len().min(self.0.len());
        self.0[..n].copy_from_slice(&value[..n]);
        n
    }

    pub fn write_str(&mut self, s: &str) -> usize {
        self.write(s.as_bytes())
    }

    /// A new buffer holding this buffer followed by `data`.
    pub fn append(&self, data: &[u8]) -> ByteBuffer {
        let mut out = Vec::with_capacity(self.0.len() + data.len());
        out.extend_from_slice(&self.0);
        out.extend_from_slice(data);
        ByteBuffer(out)
    }

    /// Bytes from `pos` to `end` (or the end of the buffer).
    pub fn slice(&self, pos: usize, end: Option<usize>) -> Result<&[u8], BufferError> {
        let end = end.unwrap_or(self.0.len());
        self.0.get(pos..end).ok_or(BufferError::OutOfBounds {
            offset: pos,
            width: end.saturating_sub(pos),
            len: self.0.len(),
        })
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn write_to<W: io::Write>(&self, mut w: W) -> io::Result<usize> {
        w.write_all(&self.0)?;
        Ok(self.0.len())
    }

    /// Fills the existing capacity from `r`; returns the bytes read.
    pub fn read_from<R: io::Read>(&mut self, mut r: R) -> io::Result<usize> {
        r.read(&mut self.0)
    }

    /// Decodes the whole buffer as a variable-width integer.
    pub fn to_int(&self) -> Result<Int, BufferError> {
        Int::from_bytes(&self.0)
    }

    /// Decodes the whole buffer as an 8-byte float.
    pub fn to_float(&self) -> Result<Float, BufferError> {
        Float::from_bytes(&self.0)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, BufferError> {
        number::read_u16(&self.0, offset)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, BufferError> {
        number::read_u32(&self.0, offset)
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64, BufferError> {
        number::read_u64(&self.0, offset)
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16, BufferError> {
        number::read_i16(&self.0, offset)
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32, BufferError> {
        number::read_i32(&self.0, offset)
    }

    pub fn read_i64(&self, offset: usize) -> Result<i64, BufferError> {
        number::read_i64(&self.0, offset)
    }

    pub fn read_f64(&self, offset: usize) -> Result<f64, BufferError> {
        number::read_f64(&self.0, offset)
    }

    pub fn write_u16(&mut self, offset: usize, val: u16) -> Result<(), BufferError> {
        number::write_u16(&mut self.0, offset, val)
    }

    pub fn write_u32(&mut self, offset: usize, val: u32) -> Result<(), BufferError> {
        number::write_u32(&mut self.0, offset, val)
    }

    pub fn write_u64(&mut self, offset: usize, val: u64) -> Result<(), BufferError> {
        number::write_u64(&mut self.0, offset, val)
    }

    pub fn write_i16(&mut self, offset: usize, val: i16) -> Result<(), BufferError> {
        number::write_i16(&mut self.0, offset, val)
    }

    pub fn write_i32(&mut self, offset: usize, val: i32) -> Result<(), BufferError> {
        number::write_i32(&mut self.0, offset, val)
    }

    pub fn write_i64(&mut self, offset: usize, val: i64) -> Result<(), BufferError> {
        number::write_i64(&mut self.0, offset, val)
    }

    pub fn write_f64(&mut self, offset: usize, val: f64) -> Result<(), BufferError> {
        number::write_f64(&mut self.0, offset, val)
    }
}

impl Deref for ByteBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(v: &[u8]) -> Self {
        Self(v.to_vec())
    }
}

impl From<&str> for ByteBuffer {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for ByteBuffer {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<ByteBuffer> for Vec<u8> {
    fn from(b: ByteBuffer) -> Self {
        b.0
    }
}

impl fmt::Display for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
