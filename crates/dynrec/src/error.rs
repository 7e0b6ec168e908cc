use dynrec_json_pack::{CborError, MsgPackError};
use dynrec_json_path::JsonPathError;
use dynrec_util::SequenceError;
use thiserror::Error;

use crate::value::ValueKind;

/// Failures of the wire codecs.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("msgpack: {0}")]
    MsgPack(#[from] MsgPackError),
    #[error("cbor: {0}")]
    Cbor(#[from] CborError),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("cannot convert {0}")]
    Conversion(String),
    #[error("{0} is not callable")]
    NotCallable(String),
    #[error("{key} takes {expected} arguments, got {actual}")]
    ArityMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },
    #[error("call to {key} failed: {message}")]
    CallFailed { key: String, message: String },
    #[error("cannot mutate `{path}`: {source}")]
    StructuralMutation {
        path: String,
        #[source]
        source: JsonPathError,
    },
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("expected an object, found {0}")]
    NotAnObject(ValueKind),
}

impl RecordError {
    pub(crate) fn mutation(path: &str, source: JsonPathError) -> Self {
        RecordError::StructuralMutation {
            path: path.to_string(),
            source,
        }
    }
}

pub type Result<T, E = RecordError> = std::result::Result<T, E>;
