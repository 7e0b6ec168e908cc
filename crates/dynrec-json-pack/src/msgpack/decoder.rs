//! `MsgPackDecoder`: reads MessagePack into [`PackValue`]s.

use dynrec_buffers::Reader;

use super::error::MsgPackError;
use crate::PackValue;

/// Deepest container nesting the decoder accepts.
pub const MAX_DEPTH: usize = 128;

pub struct MsgPackDecoder<'a> {
    reader: Reader<'a>,
    depth: usize,
}

impl<'a> MsgPackDecoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            reader: Reader::new(input),
            depth: 0,
        }
    }

    /// Reads one value and requires the input to end there.
    pub fn decode(&mut self) -> Result<PackValue, MsgPackError> {
        let value = self.read_any()?;
        match self.reader.remaining() {
            0 => Ok(value),
            n => Err(MsgPackError::TrailingBytes(n)),
        }
    }

    pub fn read_any(&mut self) -> Result<PackValue, MsgPackError> {
        let byte = self.reader.u8()?;

        // negative fixint: 0xe0–0xff → -32..–1
        if byte >= 0xe0 {
            return Ok(PackValue::Integer(byte as i8 as i64));
        }
        // positive fixint: 0x00–0x7f
        if byte <= 0x7f {
            return Ok(PackValue::Integer(byte as i64));
        }
        // fixmap: 0x80–0x8f
        if (0x80..=0x8f).contains(&byte) {
            return self.read_obj(byte as usize & 0xf);
        }
        // fixarray: 0x90–0x9f
        if (0x90..=0x9f).contains(&byte) {
            return self.read_arr(byte as usize & 0xf);
        }
        // fixstr: 0xa0–0xbf
        if (0xa0..=0xbf).contains(&byte) {
            return self.read_str(byte as usize & 0x1f).map(PackValue::Str);
        }

        match byte {
            0xc0 => Ok(PackValue::Null),
            0xc2 => Ok(PackValue::Bool(false)),
            0xc3 => Ok(PackValue::Bool(true)),
            // bin8, bin16, bin32
            0xc4 => {
                let n = self.reader.u8()? as usize;
                self.read_bin(n)
            }
            0xc5 => {
                let n = self.reader.u16()? as usize;
                self.read_bin(n)
            }
            0xc6 => {
                let n = self.reader.u32()? as usize;
                self.read_bin(n)
            }
            // ext8, ext16, ext32 and fixext
            0xc7 | 0xc8 | 0xc9 | 0xd4..=0xd8 => Err(MsgPackError::UnsupportedExtension(
                self.ext_type(byte)?,
            )),
            // float32, float64
            0xca => Ok(PackValue::Float(self.reader.f32()? as f64)),
            0xcb => Ok(PackValue::Float(self.reader.f64()?)),
            // uint8, uint16, uint32, uint64
            0xcc => Ok(PackValue::Integer(self.reader.u8()? as i64)),
            0xcd => Ok(PackValue::Integer(self.reader.u16()? as i64)),
            0xce => Ok(PackValue::Integer(self.reader.u32()? as i64)),
            0xcf => {
                let u = self.reader.u64()?;
                Ok(match i64::try_from(u) {
                    Ok(i) => PackValue::Integer(i),
                    Err(_) => PackValue::UInteger(u),
                })
            }
            // int8, int16, int32, int64
            0xd0 => Ok(PackValue::Integer(self.reader.i8()? as i64)),
            0xd1 => Ok(PackValue::Integer(self.reader.i16()? as i64)),
            0xd2 => Ok(PackValue::Integer(self.reader.i32()? as i64)),
            0xd3 => Ok(PackValue::Integer(self.reader.i64()?)),
            // str8, str16, str32
            0xd9 => {
                let n = self.reader.u8()? as usize;
                self.read_str(n).map(PackValue::Str)
            }
            0xda => {
                let n = self.reader.u16()? as usize;
                self.read_str(n).map(PackValue::Str)
            }
            0xdb => {
                let n = self.reader.u32()? as usize;
                self.read_str(n).map(PackValue::Str)
            }
            // array16, array32
            0xdc => {
                let n = self.reader.u16()? as usize;
                self.read_arr(n)
            }
            0xdd => {
                let n = self.reader.u32()? as usize;
                self.read_arr(n)
            }
            // map16, map32
            0xde => {
                let n = self.reader.u16()? as usize;
                self.read_obj(n)
            }
            0xdf => {
                let n = self.reader.u32()? as usize;
                self.read_obj(n)
            }
            _ => Err(MsgPackError::InvalidByte(self.reader.position() - 1)),
        }
    }

    /// Type byte of an extension whose marker has just been read.
    fn ext_type(&mut self, marker: u8) -> Result<i8, MsgPackError> {
        match marker {
            0xc7 => {
                self.reader.u8()?;
            }
            0xc8 => {
                self.reader.u16()?;
            }
            0xc9 => {
                self.reader.u32()?;
            }
            _ => {}
        }
        Ok(self.reader.i8()?)
    }

    fn read_str(&mut self, size: usize) -> Result<String, MsgPackError> {
        Ok(self.reader.utf8(size)?.to_string())
    }

    fn read_bin(&mut self, size: usize) -> Result<PackValue, MsgPackError> {
        Ok(PackValue::Bytes(self.reader.buf(size)?.to_vec()))
    }

    fn nested<F>(&mut self, read: F) -> Result<PackValue, MsgPackError>
    where
        F: FnOnce(&mut Self) -> Result<PackValue, MsgPackError>,
    {
        if self.depth >= MAX_DEPTH {
            return Err(MsgPackError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = read(self);
        self.depth -= 1;
        value
    }

    // Declared lengths come from the input, so preallocation is capped by
    // what is left to read.
    fn read_obj(&mut self, size: usize) -> Result<PackValue, MsgPackError> {
        self.nested(|this| {
            let mut obj = Vec::with_capacity(size.min(this.reader.remaining()));
            for _ in 0..size {
                let key = this.read_key()?;
                let val = this.read_any()?;
                obj.push((key, val));
            }
            Ok(PackValue::Object(obj))
        })
    }

    fn read_arr(&mut self, size: usize) -> Result<PackValue, MsgPackError> {
        self.nested(|this| {
            let mut arr = Vec::with_capacity(size.min(this.reader.remaining()));
            for _ in 0..size {
                arr.push(this.read_any()?);
            }
            Ok(PackValue::Array(arr))
        })
    }

    pub fn read_key(&mut self) -> Result<String, MsgPackError> {
        let byte = self.reader.peek()?;
        let size = match byte {
            0xa0..=0xbf => {
                self.reader.u8()?;
                (byte & 0x1f) as usize
            }
            0xd9 => {
                self.reader.u8()?;
                self.reader.u8()? as usize
            }
            0xda => {
                self.reader.u8()?;
                self.reader.u16()? as usize
            }
            0xdb => {
                self.reader.u8()?;
                self.reader.u32()? as usize
            }
            _ => return Err(MsgPackError::NotStr),
        };
        self.read_str(size)
    }
}
