//! Path-addressable dynamic records.
//!
//! A [`Record`] is a string-keyed map of [`Value`]s that can be read and
//! written through dotted paths, merged, compared and serialized through
//! interchangeable codecs:
//!
//! - JSON text ([`JsonCodec`]), the form path queries run against;
//! - CBOR ([`CborCodec`]) for binary snapshots;
//! - MessagePack ([`MsgPackCodec`]).
//!
//! Every record carries its own reader/writer lock, so a shared
//! `Arc<Record>` can be used from several threads. [`LockMode::Global`]
//! additionally serializes operations across all records in that mode.
//!
//! ```
//! use dynrec::{Record, Value};
//!
//! let user = Record::from_json(r#"{"name":"ann","langs":["rust"]}"#).unwrap();
//! user.set("langs.-1", "go").unwrap();
//! assert_eq!(user.get("langs.#").as_i64(), Some(2));
//!
//! let copy = Record::decode_binary(&user.encode_binary().unwrap()).unwrap();
//! assert_eq!(copy.get("name").value(), Value::from("ann"));
//! ```

mod codec;
mod encode;
mod error;
mod lock;
mod record;
mod result;
mod store;
mod value;

pub use codec::{CborCodec, Codec, JsonCodec, MsgPackCodec};
pub use encode::{encode, encode_as, Encoding};
pub use error::{CodecError, RecordError, Result};
pub use lock::LockMode;
pub use record::Record;
pub use result::PathResult;
pub use store::{FileStore, MemoryFileStore, OsFileStore};
pub use value::{Callable, Value, ValueKind};

pub use dynrec_buffers::ByteBuffer;
pub use dynrec_json_path::Kind;
pub use dynrec_util::Sequence;
