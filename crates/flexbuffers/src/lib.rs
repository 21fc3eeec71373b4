//! FlexBuffers support for tree-ensemble model attributes.
//!
//! Models arrive as a FlexBuffers map of scalars, strings and blobs. This
//! crate decodes that subset of the format from untrusted bytes without
//! panicking and without copying, and provides [`MapBuilder`] to produce
//! such maps.
//!
//! Format reference: <https://google.github.io/flatbuffers/flexbuffers.html>

mod decoder;
mod encoder;
mod error;
mod types;

pub use decoder::{root, Map, Reference};
pub use encoder::{MapBuilder, MapValue};
pub use error::FlexError;
pub use types::FlexType;
