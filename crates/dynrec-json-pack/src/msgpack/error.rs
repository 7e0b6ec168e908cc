use dynrec_buffers::BufferError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MsgPackError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("invalid marker byte at offset {0}")]
    InvalidByte(usize),
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,
    #[error("map key is not a string")]
    NotStr,
    #[error("extension type {0} is not supported")]
    UnsupportedExtension(i8),
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("containers nested deeper than {0} levels")]
    TooDeep(usize),
}

impl From<BufferError> for MsgPackError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::InvalidUtf8 => MsgPackError::InvalidUtf8,
            _ => MsgPackError::UnexpectedEof,
        }
    }
}
