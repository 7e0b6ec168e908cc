//! `MsgPackEncoder`: writes [`PackValue`]s as MessagePack.
//!
//! Integers take the smallest representation that holds them. Floats are
//! always written as float64.

use dynrec_buffers::Writer;

use crate::PackValue;

/// Length header layout of one MessagePack family.
struct Header {
    /// Marker base and largest length of the one-byte "fix" form.
    fix: Option<(u8, usize)>,
    len8: Option<u8>,
    len16: u8,
    len32: u8,
}

const STR: Header = Header {
    fix: Some((0xa0, 0x1f)),
    len8: Some(0xd9),
    len16: 0xda,
    len32: 0xdb,
};

const BIN: Header = Header {
    fix: None,
    len8: Some(0xc4),
    len16: 0xc5,
    len32: 0xc6,
};

const ARRAY: Header = Header {
    fix: Some((0x90, 0x0f)),
    len8: None,
    len16: 0xdc,
    len32: 0xdd,
};

const MAP: Header = Header {
    fix: Some((0x80, 0x0f)),
    len8: None,
    len16: 0xde,
    len32: 0xdf,
};

#[derive(Debug, Default)]
pub struct MsgPackEncoder {
    pub writer: Writer,
}

impl MsgPackEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes one value and returns its bytes.
    pub fn encode(&mut self, value: &PackValue) -> Vec<u8> {
        self.writer.reset();
        self.value(value);
        self.writer.flush()
    }

    pub fn value(&mut self, value: &PackValue) {
        match value {
            PackValue::Null => self.writer.u8(0xc0),
            PackValue::Bool(false) => self.writer.u8(0xc2),
            PackValue::Bool(true) => self.writer.u8(0xc3),
            PackValue::Integer(i) => self.int(*i),
            PackValue::UInteger(u) => self.uint(*u),
            PackValue::Float(f) => self.writer.u8f64(0xcb, *f),
            PackValue::Bytes(bytes) => {
                self.header(&BIN, bytes.len());
                self.writer.buf(bytes);
            }
            PackValue::Str(s) => self.str(s),
            PackValue::Array(items) => {
                self.header(&ARRAY, items.len());
                items.iter().for_each(|item| self.value(item));
            }
            PackValue::Object(pairs) => {
                self.header(&MAP, pairs.len());
                for (key, item) in pairs {
                    self.str(key);
                    self.value(item);
                }
            }
        }
    }

    fn header(&mut self, layout: &Header, len: usize) {
        match (layout.fix, layout.len8) {
            (Some((base, max)), _) if len <= max => self.writer.u8(base | len as u8),
            (_, Some(marker)) if len <= 0xff => {
                self.writer.u8(marker);
                self.writer.u8(len as u8);
            }
            _ if len <= 0xffff => self.writer.u8u16(layout.len16, len as u16),
            _ => self.writer.u8u32(layout.len32, len as u32),
        }
    }

    pub fn str(&mut self, s: &str) {
        self.header(&STR, s.len());
        self.writer.utf8(s);
    }

    pub fn int(&mut self, int: i64) {
        match int {
            0.. => self.uint(int as u64),
            // negative fixint, 0xe0..=0xff
            -0x20..=-1 => self.writer.i8(int as i8),
            -0x8000..=-0x21 => {
                self.writer.u8(0xd1);
                self.writer.i16(int as i16);
            }
            -0x8000_0000..=-0x8001 => {
                self.writer.u8(0xd2);
                self.writer.i32(int as i32);
            }
            _ => {
                self.writer.u8(0xd3);
                self.writer.i64(int);
            }
        }
    }

    pub fn uint(&mut self, uint: u64) {
        match uint {
            0..=0x7f => self.writer.u8(uint as u8),
            0x80..=0xffff => self.writer.u8u16(0xcd, uint as u16),
            0x1_0000..=0xffff_ffff => self.writer.u8u32(0xce, uint as u32),
            _ => self.writer.u8u64(0xcf, uint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(value: PackValue) -> Vec<u8> {
        MsgPackEncoder::new().encode(&value)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(enc(PackValue::Null), [0xc0]);
        assert_eq!(enc(PackValue::Bool(true)), [0xc3]);
        assert_eq!(enc(PackValue::Bool(false)), [0xc2]);
        assert_eq!(enc(PackValue::Float(1.0)), [0xcb, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(enc(PackValue::Integer(0)), [0x00]);
        assert_eq!(enc(PackValue::Integer(127)), [0x7f]);
        assert_eq!(enc(PackValue::Integer(128)), [0xcd, 0x00, 0x80]);
        assert_eq!(enc(PackValue::Integer(70_000)), [0xce, 0x00, 0x01, 0x11, 0x70]);
        assert_eq!(enc(PackValue::Integer(-1)), [0xff]);
        assert_eq!(enc(PackValue::Integer(-32)), [0xe0]);
        assert_eq!(enc(PackValue::Integer(-33)), [0xd1, 0xff, 0xdf]);
        assert_eq!(enc(PackValue::Integer(-70_000)), [0xd2, 0xff, 0xfe, 0xee, 0x90]);
        assert_eq!(
            enc(PackValue::Integer(i64::MIN)),
            [0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(
            enc(PackValue::UInteger(u64::MAX)),
            [0xcf, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn test_strings_and_bins() {
        assert_eq!(enc("ab".into()), [0xa2, b'a', b'b']);
        let long = "x".repeat(40);
        let out = enc(long.as_str().into());
        assert_eq!(&out[..2], &[0xd9, 40]);
        assert_eq!(out.len(), 42);
        assert_eq!(enc(PackValue::Bytes(vec![1, 2])), [0xc4, 2, 1, 2]);
    }

    #[test]
    fn test_containers() {
        let v = PackValue::Object(vec![(
            "a".into(),
            PackValue::Array(vec![PackValue::Integer(1), PackValue::Null]),
        )]);
        assert_eq!(enc(v), [0x81, 0xa1, b'a', 0x92, 0x01, 0xc0]);
        let wide = PackValue::Array(vec![PackValue::Null; 16]);
        assert_eq!(&enc(wide)[..3], &[0xdc, 0x00, 0x10]);
        let big = PackValue::Bytes(vec![0; 300]);
        assert_eq!(&enc(big)[..3], &[0xc5, 0x01, 0x2c]);
    }
}
