//! FlexBuffers decoder error type.

use thiserror::Error;
use tree_ensemble_buffers::BufferError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlexError {
    #[error("buffer of {0} bytes is too short to hold a flexbuffers root")]
    TooShort(usize),
    #[error("invalid byte width {0}")]
    InvalidWidth(u64),
    #[error("unknown packed type {0:#04x}")]
    UnknownType(u8),
    #[error("expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
    #[error("key `{0}` not found")]
    KeyNotFound(String),
    #[error("index {index} is out of range for a map of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("offset {offset} at position {position} points outside the buffer")]
    BadOffset { position: usize, offset: u64 },
    #[error("value {0} does not fit the requested integer type")]
    Overflow(i128),
    #[error("map has {values} values but {keys} keys")]
    KeyCountMismatch { values: u64, keys: u64 },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
