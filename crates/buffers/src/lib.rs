//! Little-endian binary buffer utilities for tree-ensemble.
//!
//! Everything in this crate reads from borrowed, untrusted byte slices and
//! never panics on short or truncated input.
//!
//! # Overview
//!
//! - [`Reader`] - Reads little-endian data from a byte slice with cursor tracking
//! - [`LeSlice`] - A typed, non-owning view over a byte slice with unaligned element reads
//!
//! # Example
//!
//! ```
//! use tree_ensemble_buffers::{LeSlice, Reader};
//!
//! let data = [0x01, 0x03, 0x02, 0x00, 0x00, 0x80, 0x3f];
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.u8().unwrap(), 0x01);
//! assert_eq!(reader.u16().unwrap(), 0x0203);
//!
//! let floats: LeSlice<'_, f32> = LeSlice::new(&data[3..]);
//! assert_eq!(floats.get(0), Some(1.0));
//! ```

mod le_slice;
mod reader;

pub use le_slice::{to_le_bytes, LeScalar, LeSlice};
pub use reader::Reader;

use thiserror::Error;

/// Error type for buffer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Attempted to read past the end of the buffer.
    #[error("read of {len} bytes at offset {offset} runs past the end of a {size}-byte buffer")]
    EndOfBuffer {
        offset: usize,
        len: usize,
        size: usize,
    },
    /// A variable-width read was asked for a width other than 1, 2, 4 or 8.
    #[error("unsupported byte width {0}")]
    InvalidWidth(usize),
    /// Invalid UTF-8 sequence.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    /// A NUL-terminated string had no terminator before the end of the buffer.
    #[error("unterminated string at offset {0}")]
    Unterminated(usize),
}
