//! Attribute keys and the one supported type-tag combination.

pub const NUM_LEAF_NODES: &str = "num_leaf_nodes";
pub const NUM_INTERNAL_NODES: &str = "num_internal_nodes";
pub const NUM_TREES: &str = "num_trees";

pub const NODES_MODES: &str = "nodes_modes";
pub const NODES_FEATUREIDS: &str = "nodes_featureids";
pub const NODES_VALUES: &str = "nodes_values";
pub const NODES_TRUENODEIDS: &str = "nodes_truenodeids";
pub const NODES_FALSENODEIDS: &str = "nodes_falsenodeids";
pub const NODES_WEIGHTS: &str = "nodes_weights";
pub const NODES_CLASSIDS: &str = "nodes_classids";
pub const TREE_ROOT_IDS: &str = "tree_root_ids";

pub const TREE_INDEX_TYPE: &str = "tree_index_type";
pub const NODE_VALUE_TYPE: &str = "node_value_type";
pub const CLASS_INDEX_TYPE: &str = "class_index_type";
pub const CLASS_WEIGHT_TYPE: &str = "class_weight_type";
pub const EQUALITY_OPERATOR: &str = "equality_operator";

/// The five encoding tags a model declares for its arrays and comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeTags<'a> {
    pub tree_index_type: &'a str,
    pub node_value_type: &'a str,
    pub class_index_type: &'a str,
    pub class_weight_type: &'a str,
    pub equality_operator: &'a str,
}

impl TypeTags<'static> {
    /// 16-bit node indices, `f32` thresholds, 8-bit class ids, `f32` weights,
    /// `<=` comparison.
    pub const SUPPORTED: TypeTags<'static> = TypeTags {
        tree_index_type: "uint16",
        node_value_type: "float32",
        class_index_type: "uint8",
        class_weight_type: "float32",
        equality_operator: "leq",
    };
}

impl Default for TypeTags<'static> {
    fn default() -> Self {
        Self::SUPPORTED
    }
}

impl<'a> TypeTags<'a> {
    /// `(attribute key, declared value)` pairs in validation order.
    pub fn entries(&self) -> [(&'static str, &'a str); 5] {
        [
            (TREE_INDEX_TYPE, self.tree_index_type),
            (NODE_VALUE_TYPE, self.node_value_type),
            (CLASS_INDEX_TYPE, self.class_index_type),
            (CLASS_WEIGHT_TYPE, self.class_weight_type),
            (EQUALITY_OPERATOR, self.equality_operator),
        ]
    }
}
