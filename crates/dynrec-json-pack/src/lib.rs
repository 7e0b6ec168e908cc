//! Binary serialization formats for dynrec.
//!
//! [`PackValue`] is the format-neutral value every codec here reads and
//! writes. It carries what JSON can express plus raw bytes and unsigned
//! 64-bit integers.
//!
//! - [`msgpack`]: MessagePack encoder/decoder on top of the
//!   `dynrec-buffers` cursors.
//! - [`cbor`]: CBOR through `ciborium`.
//! - [`binary`]: embeds byte strings in JSON text as data URIs.
//!
//! ```
//! use dynrec_json_pack::{msgpack, PackValue};
//!
//! let value = PackValue::from(serde_json::json!({"id": 7, "tags": ["a"]}));
//! let bytes = msgpack::encode(&value);
//! assert_eq!(msgpack::decode(&bytes).unwrap(), value);
//! ```

mod pack_value;

pub mod binary;
pub mod cbor;
pub mod msgpack;

pub use cbor::{decode_cbor, encode_cbor, CborError};
pub use msgpack::{MsgPackDecoder, MsgPackEncoder, MsgPackError};
pub use pack_value::PackValue;
