//! Flattened, borrowed representation of a tree ensemble.

use tree_ensemble_buffers::LeSlice;

use crate::attributes::TypeTags;

/// An ensemble of binary decision trees laid out as parallel arrays.
///
/// Nodes live in one combined index space: internal nodes occupy
/// `[0, num_internal_nodes)` and leaves follow at
/// `[num_internal_nodes, num_internal_nodes + num_leaf_nodes)`. Per-internal
/// arrays are indexed by the combined index directly; per-leaf arrays by
/// `combined - num_internal_nodes`.
///
/// Every array is a view into the buffer the descriptor was decoded from,
/// which must outlive it. A descriptor is unchecked: it has to go through
/// [`validate`](Self::validate) before it can be evaluated.
#[derive(Debug, Clone, Copy)]
pub struct ModelDescriptor<'a> {
    pub(crate) num_leaf_nodes: u32,
    pub(crate) num_internal_nodes: u32,
    pub(crate) num_trees: u32,
    pub(crate) nodes_modes: LeSlice<'a, u16>,
    pub(crate) nodes_featureids: LeSlice<'a, u16>,
    pub(crate) nodes_values: LeSlice<'a, f32>,
    pub(crate) nodes_truenodeids: LeSlice<'a, u16>,
    pub(crate) nodes_falsenodeids: LeSlice<'a, u16>,
    pub(crate) nodes_weights: LeSlice<'a, f32>,
    pub(crate) nodes_classids: LeSlice<'a, u8>,
    pub(crate) tree_root_ids: LeSlice<'a, u16>,
    pub(crate) tags: TypeTags<'a>,
}

impl<'a> ModelDescriptor<'a> {
    pub fn num_leaf_nodes(&self) -> u32 {
        self.num_leaf_nodes
    }

    pub fn num_internal_nodes(&self) -> u32 {
        self.num_internal_nodes
    }

    pub fn num_trees(&self) -> u32 {
        self.num_trees
    }

    /// Size of the combined node index space.
    pub fn num_nodes(&self) -> u64 {
        u64::from(self.num_internal_nodes) + u64::from(self.num_leaf_nodes)
    }

    pub fn tags(&self) -> &TypeTags<'a> {
        &self.tags
    }

    /// Reserved per-internal-node mode tags; may be empty.
    pub fn nodes_modes(&self) -> LeSlice<'a, u16> {
        self.nodes_modes
    }

    pub fn nodes_featureids(&self) -> LeSlice<'a, u16> {
        self.nodes_featureids
    }

    pub fn nodes_values(&self) -> LeSlice<'a, f32> {
        self.nodes_values
    }

    pub fn nodes_truenodeids(&self) -> LeSlice<'a, u16> {
        self.nodes_truenodeids
    }

    pub fn nodes_falsenodeids(&self) -> LeSlice<'a, u16> {
        self.nodes_falsenodeids
    }

    pub fn nodes_weights(&self) -> LeSlice<'a, f32> {
        self.nodes_weights
    }

    pub fn nodes_classids(&self) -> LeSlice<'a, u8> {
        self.nodes_classids
    }

    pub fn tree_root_ids(&self) -> LeSlice<'a, u16> {
        self.tree_root_ids
    }
}
