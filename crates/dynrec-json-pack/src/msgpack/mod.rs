//! MessagePack encoder/decoder.

mod decoder;
mod encoder;
mod error;

pub use decoder::{MsgPackDecoder, MAX_DEPTH};
pub use encoder::MsgPackEncoder;
pub use error::MsgPackError;

use crate::PackValue;

/// Encodes `value` with a fresh encoder.
pub fn encode(value: &PackValue) -> Vec<u8> {
    MsgPackEncoder::new().encode(value)
}

/// Decodes exactly one value from `input`.
pub fn decode(input: &[u8]) -> Result<PackValue, MsgPackError> {
    MsgPackDecoder::new(input).decode()
}
