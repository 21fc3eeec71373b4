#![allow(dead_code)]

use tree_ensemble::{EnsembleModel, ModelDescriptor, ModelError, ValidatedModel};

/// `features[feature] <= threshold` scores `weights.0` on class 0, otherwise
/// `weights.1` on class 1.
pub fn stump(feature: u16, threshold: f32, weights: (f32, f32)) -> EnsembleModel {
    EnsembleModel {
        nodes_featureids: vec![feature],
        nodes_values: vec![threshold],
        nodes_truenodeids: vec![1],
        nodes_falsenodeids: vec![2],
        nodes_weights: vec![weights.0, weights.1],
        nodes_classids: vec![0, 1],
        tree_root_ids: vec![0],
        ..EnsembleModel::default()
    }
    .with_counts()
}

/// Two trees over three features and three classes.
///
/// Tree 0 (root 0): `f0 <= 1.0` ? (`f1 <= 0.0` ? leaf 3 : leaf 4) : leaf 5
/// Tree 1 (root 2): `f2 <= -1.0` ? leaf 6 : leaf 7
pub fn two_trees() -> EnsembleModel {
    EnsembleModel {
        nodes_modes: vec![1, 1, 1],
        nodes_featureids: vec![0, 1, 2],
        nodes_values: vec![1.0, 0.0, -1.0],
        nodes_truenodeids: vec![1, 3, 6],
        nodes_falsenodeids: vec![5, 4, 7],
        nodes_weights: vec![0.1, 0.2, 0.3, 0.4, 0.5],
        nodes_classids: vec![0, 1, 2, 0, 2],
        tree_root_ids: vec![0, 2],
        ..EnsembleModel::default()
    }
    .with_counts()
}

pub fn validated(bytes: &[u8], input_width: usize, output_width: usize) -> ValidatedModel<'_> {
    ModelDescriptor::from_bytes(bytes)
        .expect("load")
        .validate_widths(input_width, output_width)
        .expect("validate")
}

pub fn rejected(bytes: &[u8], input_width: usize, output_width: usize) -> ModelError {
    ModelDescriptor::from_bytes(bytes)
        .expect("load")
        .validate_widths(input_width, output_width)
        .expect_err("validation should fail")
}
