//! Decision-tree ensemble classifier inference.
//!
//! Models are FlexBuffers attribute maps describing an ensemble of binary
//! trees as flat parallel arrays. A model goes through three stages:
//!
//! 1. [`ModelDescriptor::from_bytes`] decodes the map and borrows the arrays
//!    from the input buffer without copying.
//! 2. [`ModelDescriptor::validate`] checks, once, that no index in the model
//!    can take evaluation out of bounds for the given tensor widths, and
//!    returns a [`ValidatedModel`].
//! 3. [`ValidatedModel::evaluate`] walks every tree for one feature vector
//!    and sums leaf weights per class. It never allocates and cannot fail.
//!
//! [`TreeEnsembleClassifier`] wraps the same stages in the init / prepare /
//! eval shape that host runtimes expect.
//!
//! # Example
//!
//! ```
//! use tree_ensemble::{EnsembleModel, ModelDescriptor};
//!
//! // One stump on feature 0: `x <= 0.5` scores class 0, otherwise class 1.
//! let bytes = EnsembleModel {
//!     nodes_featureids: vec![0],
//!     nodes_values: vec![0.5],
//!     nodes_truenodeids: vec![1],
//!     nodes_falsenodeids: vec![2],
//!     nodes_weights: vec![1.0, 1.0],
//!     nodes_classids: vec![0, 1],
//!     tree_root_ids: vec![0],
//!     ..EnsembleModel::default()
//! }
//! .with_counts()
//! .to_bytes();
//!
//! let model = ModelDescriptor::from_bytes(&bytes)?.validate_widths(1, 2)?;
//! let mut scores = [0.0; 2];
//! model.evaluate(&[0.5], &mut scores);
//! assert_eq!(scores, [1.0, 0.0]);
//! # Ok::<(), tree_ensemble::ModelError>(())
//! ```

pub mod attributes;

mod descriptor;
mod deserialize;
mod encode;
mod error;
mod evaluate;
mod operator;
mod options;
mod shape;
mod validate;

pub use attributes::TypeTags;
pub use descriptor::ModelDescriptor;
pub use encode::EnsembleModel;
pub use error::{ErrorKind, IndexKind, MalformedReason, ModelError};
pub use operator::{TreeEnsembleClassifier, OPERATOR_NAME};
pub use options::ValidateOptions;
pub use shape::{OpSignature, TensorShape};
pub use validate::ValidatedModel;
