//! Structural validation: the only way to obtain a [`ValidatedModel`].

use tracing::{debug, warn};
use tree_ensemble_buffers::{LeScalar, LeSlice};

use crate::attributes::{self as attr, TypeTags};
use crate::error::{IndexKind, MalformedReason};
use crate::{ModelDescriptor, ModelError, OpSignature, ValidateOptions};

/// A model that passed every structural check against a fixed pair of
/// feature and score widths.
///
/// Only [`ModelDescriptor::validate`] builds one, so holding a
/// `ValidatedModel` is proof that evaluation stays in bounds.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedModel<'a> {
    pub(crate) model: ModelDescriptor<'a>,
    pub(crate) input_width: usize,
    pub(crate) output_width: usize,
    pub(crate) max_depth: Option<u32>,
}

impl<'a> ValidatedModel<'a> {
    pub fn descriptor(&self) -> &ModelDescriptor<'a> {
        &self.model
    }

    /// Number of features each evaluation reads.
    pub fn input_width(&self) -> usize {
        self.input_width
    }

    /// Number of class scores each evaluation writes.
    pub fn output_width(&self) -> usize {
        self.output_width
    }

    /// Internal nodes on the deepest root-to-leaf path, when the trees were
    /// walked during validation.
    pub fn max_depth(&self) -> Option<u32> {
        self.max_depth
    }
}

impl<'a> ModelDescriptor<'a> {
    /// Validates against a single `[1, input_width]` input and
    /// `[1, output_width]` output with default options.
    pub fn validate_widths(
        &self,
        input_width: usize,
        output_width: usize,
    ) -> Result<ValidatedModel<'a>, ModelError> {
        self.validate(
            &OpSignature::dense(input_width, output_width),
            &ValidateOptions::default(),
        )
    }

    /// Runs every structural check and returns the evaluable model.
    ///
    /// Checks run in a fixed order and the first failure is returned:
    ///
    /// 1. type tags match [`TypeTags::SUPPORTED`] (`UnsupportedEncoding`)
    /// 2. array lengths agree with the node and tree counts (`MalformedModel`)
    /// 3. tree roots are valid node indices (`IndexOutOfBounds`)
    /// 4. true/false targets are valid node indices (`IndexOutOfBounds`)
    /// 5. one rank-2 input and one output (`ShapeMismatch`)
    /// 6. feature ids are below the input width (`IndexOutOfBounds`)
    /// 7. every leaf's class id is below the output width (`IndexOutOfBounds`)
    /// 8. optionally, no tree revisits a node and depth stays under the limit
    ///    (`CyclicTree`, `DepthLimitExceeded`)
    pub fn validate(
        &self,
        signature: &OpSignature,
        options: &ValidateOptions,
    ) -> Result<ValidatedModel<'a>, ModelError> {
        let result = self.check(signature, options);
        match &result {
            Ok(model) => debug!(
                input_width = model.input_width,
                output_width = model.output_width,
                max_depth = ?model.max_depth,
                "validated tree ensemble"
            ),
            Err(error) => warn!(%error, "rejected tree ensemble"),
        }
        result
    }

    fn check(
        &self,
        signature: &OpSignature,
        options: &ValidateOptions,
    ) -> Result<ValidatedModel<'a>, ModelError> {
        check_tags(&self.tags)?;
        self.check_lengths()?;

        let num_nodes = self.num_nodes();
        check_below(IndexKind::Root, self.tree_root_ids.iter(), num_nodes)?;
        check_below(IndexKind::TrueTarget, self.nodes_truenodeids.iter(), num_nodes)?;
        check_below(IndexKind::FalseTarget, self.nodes_falsenodeids.iter(), num_nodes)?;

        let (input_width, output_width) = signature.widths()?;
        check_below(IndexKind::Feature, self.nodes_featureids.iter(), input_width as u64)?;
        // Every leaf is checked, not only those behind a mode tag: the
        // evaluator dereferences the class id of whichever leaf it lands on.
        check_below(IndexKind::Class, self.nodes_classids.iter(), output_width as u64)?;

        let max_depth = if options.walks_trees() {
            Some(self.measure_depth(options.max_depth)?)
        } else {
            None
        };

        Ok(ValidatedModel {
            model: *self,
            input_width,
            output_width,
            max_depth,
        })
    }

    fn check_lengths(&self) -> Result<(), ModelError> {
        let internal = u64::from(self.num_internal_nodes);
        let leaves = u64::from(self.num_leaf_nodes);
        expect_len(attr::NODES_FEATUREIDS, self.nodes_featureids, internal)?;
        expect_len(attr::NODES_VALUES, self.nodes_values, internal)?;
        expect_len(attr::NODES_TRUENODEIDS, self.nodes_truenodeids, internal)?;
        expect_len(attr::NODES_FALSENODEIDS, self.nodes_falsenodeids, internal)?;
        expect_len(attr::NODES_WEIGHTS, self.nodes_weights, leaves)?;
        expect_len(attr::NODES_CLASSIDS, self.nodes_classids, leaves)?;
        if self.nodes_modes.byte_len() != 0 {
            expect_len(attr::NODES_MODES, self.nodes_modes, internal)?;
        }
        expect_len(attr::TREE_ROOT_IDS, self.tree_root_ids, u64::from(self.num_trees))
    }

    /// Longest root-to-leaf path, counted in internal nodes, over all trees.
    ///
    /// Iterative depth-first walk with memoised subtree depths, so each
    /// internal node is expanded at most once and deep trees cannot overflow
    /// the call stack.
    fn measure_depth(&self, limit: Option<u32>) -> Result<u32, ModelError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Visit {
            Unseen,
            Active,
            Done,
        }

        let internal = self.num_internal_nodes as usize;
        let mut state = vec![Visit::Unseen; internal];
        let mut depth = vec![0u32; internal];
        let mut stack: Vec<(usize, bool)> = Vec::new();
        let mut deepest = 0;

        // Lengths and targets are already checked, so `get` never misses;
        // leaves report depth 0.
        let children = |node: usize| {
            [
                self.nodes_truenodeids.get(node).unwrap_or_default() as usize,
                self.nodes_falsenodeids.get(node).unwrap_or_default() as usize,
            ]
        };

        for (tree, root) in self.tree_root_ids.iter().enumerate() {
            let root = root as usize;
            if root >= internal {
                continue;
            }
            stack.push((root, false));
            while let Some((node, expanded)) = stack.pop() {
                if expanded {
                    let below = children(node)
                        .into_iter()
                        .map(|c| if c < internal { depth[c] } else { 0 })
                        .max()
                        .unwrap_or_default();
                    depth[node] = below + 1;
                    state[node] = Visit::Done;
                    continue;
                }
                match state[node] {
                    Visit::Done => continue,
                    Visit::Active => return Err(ModelError::CyclicTree { tree }),
                    Visit::Unseen => {}
                }
                state[node] = Visit::Active;
                stack.push((node, true));
                for child in children(node) {
                    if child < internal {
                        match state[child] {
                            Visit::Active => return Err(ModelError::CyclicTree { tree }),
                            Visit::Unseen => stack.push((child, false)),
                            Visit::Done => {}
                        }
                    }
                }
            }

            let tree_depth = depth[root];
            if let Some(limit) = limit {
                if tree_depth > limit {
                    return Err(ModelError::DepthLimitExceeded {
                        tree,
                        depth: tree_depth,
                        limit,
                    });
                }
            }
            deepest = deepest.max(tree_depth);
        }
        Ok(deepest)
    }
}

fn check_tags(tags: &TypeTags<'_>) -> Result<(), ModelError> {
    let supported = TypeTags::SUPPORTED.entries();
    for ((field, found), (_, expected)) in tags.entries().into_iter().zip(supported) {
        if found != expected {
            return Err(ModelError::UnsupportedEncoding {
                field,
                found: found.to_owned(),
                expected,
            });
        }
    }
    Ok(())
}

/// Compares byte lengths so a trailing partial element is also rejected.
fn expect_len<T: LeScalar>(
    key: &'static str,
    view: LeSlice<'_, T>,
    expected: u64,
) -> Result<(), ModelError> {
    let found = view.byte_len();
    if expected.checked_mul(T::WIDTH as u64) != Some(found as u64) {
        return Err(ModelError::malformed(
            key,
            MalformedReason::Length {
                expected,
                width: T::WIDTH,
                found,
            },
        ));
    }
    Ok(())
}

fn check_below<I: Into<u64>>(
    what: IndexKind,
    indices: impl Iterator<Item = I>,
    bound: u64,
) -> Result<(), ModelError> {
    for (position, index) in indices.enumerate() {
        let index = index.into();
        if index >= bound {
            return Err(ModelError::IndexOutOfBounds {
                what,
                position,
                index,
                bound,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EnsembleModel;

    /// Two internal nodes chained into three leaves:
    /// `0 -> (1, leaf 2)`, `1 -> (leaf 3, leaf 4)`.
    fn chain() -> EnsembleModel {
        EnsembleModel {
            nodes_featureids: vec![0, 1],
            nodes_values: vec![0.0, 0.0],
            nodes_truenodeids: vec![1, 3],
            nodes_falsenodeids: vec![2, 4],
            nodes_weights: vec![1.0, 2.0, 3.0],
            nodes_classids: vec![0, 0, 1],
            tree_root_ids: vec![0],
            ..EnsembleModel::default()
        }
        .with_counts()
    }

    #[test]
    fn measures_depth() {
        let bytes = chain().to_bytes();
        let model = ModelDescriptor::from_bytes(&bytes)
            .unwrap()
            .validate_widths(2, 2)
            .unwrap();
        assert_eq!(model.max_depth(), Some(2));
        assert_eq!(model.input_width(), 2);
        assert_eq!(model.output_width(), 2);
    }

    #[test]
    fn leaf_roots_have_depth_zero() {
        let model = EnsembleModel {
            tree_root_ids: vec![2, 4],
            ..chain()
        }
        .with_counts();
        let bytes = model.to_bytes();
        let validated = ModelDescriptor::from_bytes(&bytes)
            .unwrap()
            .validate_widths(2, 2)
            .unwrap();
        assert_eq!(validated.max_depth(), Some(0));
    }

    #[test]
    fn shared_subtrees_are_not_cycles() {
        // Both branches of node 0 lead to node 1.
        let model = EnsembleModel {
            nodes_falsenodeids: vec![1, 4],
            ..chain()
        };
        let bytes = model.to_bytes();
        let validated = ModelDescriptor::from_bytes(&bytes)
            .unwrap()
            .validate_widths(2, 2)
            .unwrap();
        assert_eq!(validated.max_depth(), Some(2));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let model = EnsembleModel {
            nodes_truenodeids: vec![1, 1],
            ..chain()
        };
        let bytes = model.to_bytes();
        let err = ModelDescriptor::from_bytes(&bytes)
            .unwrap()
            .validate_widths(2, 2)
            .unwrap_err();
        assert_eq!(err, ModelError::CyclicTree { tree: 0 });
    }

    #[test]
    fn walk_can_be_disabled() {
        let model = EnsembleModel {
            nodes_truenodeids: vec![1, 0],
            ..chain()
        };
        let bytes = model.to_bytes();
        let options = ValidateOptions {
            check_acyclic: false,
            max_depth: None,
        };
        let validated = ModelDescriptor::from_bytes(&bytes)
            .unwrap()
            .validate(&OpSignature::dense(2, 2), &options)
            .unwrap();
        assert_eq!(validated.max_depth(), None);
    }

    #[test]
    fn partial_trailing_element_is_malformed() {
        let mut builder = chain().to_builder();
        builder.blob(attr::NODES_VALUES, &[0; 9]);
        let bytes = builder.finish();
        let err = ModelDescriptor::from_bytes(&bytes)
            .unwrap()
            .validate_widths(2, 2)
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::malformed(
                attr::NODES_VALUES,
                MalformedReason::Length {
                    expected: 2,
                    width: 4,
                    found: 9
                }
            )
        );
    }
}
