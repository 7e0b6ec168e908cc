//! Append-only binary writer.

/// Growable big-endian writer used by the wire encoders.
///
/// Bytes written since the last [`Writer::flush`] form one chunk; `flush`
/// hands that chunk out and starts a new one.
///
/// # Example
///
/// ```
/// use dynrec_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01);
/// writer.u16(0x0203);
/// assert_eq!(writer.flush(), [0x01, 0x02, 0x03]);
/// ```
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes in the pending chunk.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Drops the pending chunk.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Returns the pending chunk and starts a new one.
    pub fn flush(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    #[inline]
    pub fn i8(&mut self, val: i8) {
        self.buf.push(val as u8);
    }

    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i16(&mut self, val: i16) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i32(&mut self, val: i32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn i64(&mut self, val: i64) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f32(&mut self, val: f32) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.buf.extend_from_slice(&val.to_be_bytes());
    }

    /// Writes a marker byte followed by a big-endian `u16`.
    pub fn u8u16(&mut self, marker: u8, val: u16) {
        self.u8(marker);
        self.u16(val);
    }

    /// Writes a marker byte followed by a big-endian `u32`.
    pub fn u8u32(&mut self, marker: u8, val: u32) {
        self.u8(marker);
        self.u32(val);
    }

    /// Writes a marker byte followed by a big-endian `u64`.
    pub fn u8u64(&mut self, marker: u8, val: u64) {
        self.u8(marker);
        self.u64(val);
    }

    /// Writes a marker byte followed by a big-endian `f64`.
    pub fn u8f64(&mut self, marker: u8, val: f64) {
        self.u8(marker);
        self.f64(val);
    }

    pub fn buf(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes the UTF-8 bytes of `s` and returns how many were written.
    pub fn utf8(&mut self, s: &str) -> usize {
        self.buf.extend_from_slice(s.as_bytes());
        s.len()
    }
}
