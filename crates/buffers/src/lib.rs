//! Byte-level building blocks for dynrec.
//!
//! - [`ByteBuffer`]: an owned byte sequence with split/join/search helpers and
//!   scalar reads and writes at fixed offsets.
//! - [`Int`] / [`Float`]: the numeric codec moving `i64`/`f64` values in and
//!   out of raw bytes.
//! - [`Writer`] / [`Reader`]: append-only and cursor-based big-endian
//!   primitives used by the binary wire codecs.
//!
//! # Example
//!
//! ```
//! use dynrec_buffers::{ByteBuffer, Int};
//!
//! let mut buf = ByteBuffer::zeroed(8);
//! buf.write_u32(0, 0xdead_beef).unwrap();
//! assert_eq!(buf.read_u32(0).unwrap(), 0xdead_beef);
//!
//! let bytes = Int(-42).to_bytes();
//! assert_eq!(Int::from_bytes(&bytes).unwrap(), Int(-42));
//! ```

use thiserror::Error;

mod bytes;
mod number;
mod reader;
mod size;
mod writer;

pub use bytes::{ByteBuffer, Found};
pub use number::{Float, Int};
pub use reader::Reader;
pub use size::byte_size;
pub use writer::Writer;

/// Errors raised by buffer reads, writes and numeric decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A cursor read ran past the end of its input.
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    /// A fixed-offset access does not fit inside the buffer.
    #[error("access of {width} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
    /// A big-integer payload is wider than 64 bits.
    #[error("integer payload of {0} bytes does not fit in 64 bits")]
    Overflow(usize),
    /// A fixed-width payload has the wrong size.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    /// Bytes that were expected to be UTF-8 are not.
    #[error("invalid UTF-8")]
    InvalidUtf8,
}
