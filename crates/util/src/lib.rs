//! dynrec-util - general purpose helpers shared by the dynrec crates.
//!
//! - [`Sequence`]: an ordered, serde-friendly list with functional helpers.
//! - [`glob`]: `*` / `?` wildcard matching used for key and value patterns.

pub mod glob;
pub mod sequence;

pub use glob::matches;
pub use sequence::{Sequence, SequenceError};
