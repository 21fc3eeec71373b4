//! Owned ensembles and their serialized attribute map.

use tree_ensemble_buffers::to_le_bytes;
use tree_ensemble_flexbuffers::MapBuilder;

use crate::attributes::{self as attr, TypeTags};

/// An ensemble held in owned arrays, for exporting models and building
/// fixtures. [`to_bytes`](Self::to_bytes) produces the attribute map that
/// [`ModelDescriptor::from_bytes`](crate::ModelDescriptor::from_bytes)
/// decodes.
///
/// Nothing is checked here: counts and arrays are written as given, so
/// inconsistent models can be produced on purpose.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleModel {
    pub num_leaf_nodes: u32,
    pub num_internal_nodes: u32,
    pub num_trees: u32,
    pub nodes_modes: Vec<u16>,
    pub nodes_featureids: Vec<u16>,
    pub nodes_values: Vec<f32>,
    pub nodes_truenodeids: Vec<u16>,
    pub nodes_falsenodeids: Vec<u16>,
    pub nodes_weights: Vec<f32>,
    pub nodes_classids: Vec<u8>,
    pub tree_root_ids: Vec<u16>,
    pub tags: TypeTags<'static>,
}

impl Default for EnsembleModel {
    fn default() -> Self {
        Self {
            num_leaf_nodes: 0,
            num_internal_nodes: 0,
            num_trees: 0,
            nodes_modes: Vec::new(),
            nodes_featureids: Vec::new(),
            nodes_values: Vec::new(),
            nodes_truenodeids: Vec::new(),
            nodes_falsenodeids: Vec::new(),
            nodes_weights: Vec::new(),
            nodes_classids: Vec::new(),
            tree_root_ids: Vec::new(),
            tags: TypeTags::SUPPORTED,
        }
    }
}

impl EnsembleModel {
    /// Sets the three counts from the array lengths: internal nodes from
    /// `nodes_featureids`, leaves from `nodes_weights`, trees from
    /// `tree_root_ids`.
    pub fn with_counts(mut self) -> Self {
        self.num_internal_nodes = self.nodes_featureids.len() as u32;
        self.num_leaf_nodes = self.nodes_weights.len() as u32;
        self.num_trees = self.tree_root_ids.len() as u32;
        self
    }

    /// The attribute map, unfinished, so individual attributes can be
    /// overridden.
    pub fn to_builder(&self) -> MapBuilder {
        let mut builder = MapBuilder::new();
        builder
            .uint(attr::NUM_LEAF_NODES, u64::from(self.num_leaf_nodes))
            .uint(attr::NUM_INTERNAL_NODES, u64::from(self.num_internal_nodes))
            .uint(attr::NUM_TREES, u64::from(self.num_trees))
            .blob(attr::NODES_MODES, &to_le_bytes(&self.nodes_modes))
            .blob(attr::NODES_FEATUREIDS, &to_le_bytes(&self.nodes_featureids))
            .blob(attr::NODES_VALUES, &to_le_bytes(&self.nodes_values))
            .blob(attr::NODES_TRUENODEIDS, &to_le_bytes(&self.nodes_truenodeids))
            .blob(attr::NODES_FALSENODEIDS, &to_le_bytes(&self.nodes_falsenodeids))
            .blob(attr::NODES_WEIGHTS, &to_le_bytes(&self.nodes_weights))
            .blob(attr::NODES_CLASSIDS, &self.nodes_classids)
            .blob(attr::TREE_ROOT_IDS, &to_le_bytes(&self.tree_root_ids));
        for (key, value) in self.tags.entries() {
            builder.string(key, value);
        }
        builder
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_builder().finish()
    }
}
