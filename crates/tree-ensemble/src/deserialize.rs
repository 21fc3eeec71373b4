//! Decoding a model descriptor from its attribute map.

use tracing::debug;
use tree_ensemble_buffers::{LeScalar, LeSlice};
use tree_ensemble_flexbuffers::{root, Map};

use crate::attributes::{self as attr, TypeTags};
use crate::{ModelDescriptor, ModelError};

impl<'a> ModelDescriptor<'a> {
    /// Decodes the FlexBuffers attribute map in `buf`.
    ///
    /// Arrays are borrowed from `buf`, not copied. Only the container format
    /// is checked here; whether the indices inside the arrays make sense is
    /// left to [`validate`](Self::validate), which needs the tensor shapes.
    ///
    /// Fails with [`ModelError::MalformedModel`] when a required attribute is
    /// missing, has the wrong type, or the map itself cannot be decoded.
    pub fn from_bytes(buf: &'a [u8]) -> Result<Self, ModelError> {
        let map = root(buf)
            .and_then(|r| r.as_map())
            .map_err(|e| ModelError::malformed("<root>", e))?;

        let descriptor = ModelDescriptor {
            num_leaf_nodes: scalar(&map, attr::NUM_LEAF_NODES)?,
            num_internal_nodes: scalar(&map, attr::NUM_INTERNAL_NODES)?,
            num_trees: scalar(&map, attr::NUM_TREES)?,
            nodes_modes: blob(&map, attr::NODES_MODES)?,
            nodes_featureids: blob(&map, attr::NODES_FEATUREIDS)?,
            nodes_values: blob(&map, attr::NODES_VALUES)?,
            nodes_truenodeids: blob(&map, attr::NODES_TRUENODEIDS)?,
            nodes_falsenodeids: blob(&map, attr::NODES_FALSENODEIDS)?,
            nodes_weights: blob(&map, attr::NODES_WEIGHTS)?,
            nodes_classids: blob(&map, attr::NODES_CLASSIDS)?,
            tree_root_ids: blob(&map, attr::TREE_ROOT_IDS)?,
            tags: TypeTags {
                tree_index_type: string(&map, attr::TREE_INDEX_TYPE)?,
                node_value_type: string(&map, attr::NODE_VALUE_TYPE)?,
                class_index_type: string(&map, attr::CLASS_INDEX_TYPE)?,
                class_weight_type: string(&map, attr::CLASS_WEIGHT_TYPE)?,
                equality_operator: string(&map, attr::EQUALITY_OPERATOR)?,
            },
        };

        debug!(
            bytes = buf.len(),
            num_trees = descriptor.num_trees,
            num_internal_nodes = descriptor.num_internal_nodes,
            num_leaf_nodes = descriptor.num_leaf_nodes,
            "decoded tree ensemble"
        );
        Ok(descriptor)
    }
}

fn scalar(map: &Map<'_>, key: &'static str) -> Result<u32, ModelError> {
    map.get(key)
        .and_then(|v| v.as_u32())
        .map_err(|e| ModelError::malformed(key, e))
}

fn blob<'a, T: LeScalar>(map: &Map<'a>, key: &'static str) -> Result<LeSlice<'a, T>, ModelError> {
    map.get(key)
        .and_then(|v| v.as_blob())
        .map(LeSlice::new)
        .map_err(|e| ModelError::malformed(key, e))
}

fn string<'a>(map: &Map<'a>, key: &'static str) -> Result<&'a str, ModelError> {
    map.get(key)
        .and_then(|v| v.as_str())
        .map_err(|e| ModelError::malformed(key, e))
}
