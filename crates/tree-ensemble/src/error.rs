//! Model loading and validation errors.

use std::fmt;

use thiserror::Error;
use tree_ensemble_flexbuffers::FlexError;

/// Every way a model can be refused. All of these are final for the model
/// that produced them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("malformed model attribute `{key}`: {reason}")]
    MalformedModel {
        key: &'static str,
        reason: MalformedReason,
    },
    #[error("unsupported encoding: `{field}` is `{found}`, expected `{expected}`")]
    UnsupportedEncoding {
        field: &'static str,
        found: String,
        expected: &'static str,
    },
    #[error("shape mismatch: {reason}")]
    ShapeMismatch { reason: String },
    #[error("{what} index {index} at position {position} is out of bounds (limit {bound})")]
    IndexOutOfBounds {
        what: IndexKind,
        position: usize,
        index: u64,
        bound: u64,
    },
    #[error("tree {tree} contains a cycle")]
    CyclicTree { tree: usize },
    #[error("tree {tree} has depth {depth}, above the limit of {limit}")]
    DepthLimitExceeded { tree: usize, depth: u32, limit: u32 },
    #[error("operator evaluated before a successful prepare")]
    NotPrepared,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MalformedReason {
    #[error(transparent)]
    Decode(#[from] FlexError),
    #[error("expected {expected} elements of {width} bytes, found {found} bytes")]
    Length {
        expected: u64,
        width: usize,
        found: usize,
    },
}

/// Which index family an [`ModelError::IndexOutOfBounds`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Root,
    TrueTarget,
    FalseTarget,
    Feature,
    Class,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexKind::Root => "tree root",
            IndexKind::TrueTarget => "true target",
            IndexKind::FalseTarget => "false target",
            IndexKind::Feature => "feature",
            IndexKind::Class => "class",
        })
    }
}

/// Fieldless discriminant of [`ModelError`], for matching and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MalformedModel,
    UnsupportedEncoding,
    ShapeMismatch,
    IndexOutOfBounds,
    CyclicTree,
    DepthLimitExceeded,
    NotPrepared,
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::MalformedModel { .. } => ErrorKind::MalformedModel,
            ModelError::UnsupportedEncoding { .. } => ErrorKind::UnsupportedEncoding,
            ModelError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            ModelError::IndexOutOfBounds { .. } => ErrorKind::IndexOutOfBounds,
            ModelError::CyclicTree { .. } => ErrorKind::CyclicTree,
            ModelError::DepthLimitExceeded { .. } => ErrorKind::DepthLimitExceeded,
            ModelError::NotPrepared => ErrorKind::NotPrepared,
        }
    }

    pub(crate) fn malformed(key: &'static str, reason: impl Into<MalformedReason>) -> Self {
        ModelError::MalformedModel {
            key,
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(reason: impl Into<String>) -> Self {
        ModelError::ShapeMismatch {
            reason: reason.into(),
        }
    }
}
