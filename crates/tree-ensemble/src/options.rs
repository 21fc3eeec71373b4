//! Validation settings.

use serde::{Deserialize, Serialize};

/// Knobs for [`ModelDescriptor::validate`](crate::ModelDescriptor::validate).
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use tree_ensemble::ValidateOptions;
///
/// let options = ValidateOptions::from_json(r#"{"max_depth": 12}"#).unwrap();
/// assert!(options.check_acyclic);
/// assert_eq!(options.max_depth, Some(12));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidateOptions {
    /// Walk every tree from its root and reject models where a path revisits
    /// a node. With this off, a cyclic model passes validation and
    /// evaluating it never returns.
    pub check_acyclic: bool,
    /// Reject trees whose deepest root-to-leaf path has more internal nodes
    /// than this. Setting a limit implies the acyclicity walk.
    pub max_depth: Option<u32>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            check_acyclic: true,
            max_depth: None,
        }
    }
}

impl ValidateOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub(crate) fn walks_trees(&self) -> bool {
        self.check_acyclic || self.max_depth.is_some()
    }
}
