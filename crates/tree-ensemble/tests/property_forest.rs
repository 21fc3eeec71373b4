//! Randomised forests against a straightforward reference walk, and hostile
//! buffers against load + validate + evaluate.

mod common;

use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tree_ensemble::{EnsembleModel, ModelDescriptor};

const MAX_DEPTH: u32 = 6;

#[derive(Debug, Clone, Copy)]
enum Child {
    Split(usize),
    Leaf(usize),
}

#[derive(Debug)]
struct Split {
    feature: u16,
    threshold: f32,
    on_true: Child,
    on_false: Child,
}

#[derive(Debug)]
struct Leaf {
    weight: f32,
    class: u8,
}

/// A forest kept as an explicit tree structure; node ids are only assigned
/// when it is flattened into an [`EnsembleModel`].
#[derive(Debug, Default)]
struct Forest {
    splits: Vec<Split>,
    leaves: Vec<Leaf>,
    roots: Vec<Child>,
    input_width: usize,
    output_width: usize,
}

impl Forest {
    fn random(rng: &mut Xoshiro256PlusPlus) -> Self {
        let mut forest = Forest {
            input_width: rng.gen_range(1..=6),
            output_width: rng.gen_range(1..=5),
            ..Forest::default()
        };
        for _ in 0..rng.gen_range(0..=6) {
            let root = forest.grow(rng, MAX_DEPTH);
            forest.roots.push(root);
        }
        forest
    }

    fn grow(&mut self, rng: &mut Xoshiro256PlusPlus, depth: u32) -> Child {
        if depth == 0 || rng.gen_bool(0.3) {
            self.leaves.push(Leaf {
                weight: rng.gen_range(-2.0..2.0),
                class: rng.gen_range(0..self.output_width) as u8,
            });
            return Child::Leaf(self.leaves.len() - 1);
        }
        let slot = self.splits.len();
        self.splits.push(Split {
            feature: rng.gen_range(0..self.input_width) as u16,
            threshold: rng.gen_range(-1.0..1.0),
            on_true: Child::Leaf(0),
            on_false: Child::Leaf(0),
        });
        let on_true = self.grow(rng, depth - 1);
        let on_false = self.grow(rng, depth - 1);
        self.splits[slot].on_true = on_true;
        self.splits[slot].on_false = on_false;
        Child::Split(slot)
    }

    fn node_id(&self, child: Child) -> u16 {
        match child {
            Child::Split(i) => i as u16,
            Child::Leaf(i) => (self.splits.len() + i) as u16,
        }
    }

    fn to_model(&self) -> EnsembleModel {
        EnsembleModel {
            nodes_modes: vec![0; self.splits.len()],
            nodes_featureids: self.splits.iter().map(|s| s.feature).collect(),
            nodes_values: self.splits.iter().map(|s| s.threshold).collect(),
            nodes_truenodeids: self.splits.iter().map(|s| self.node_id(s.on_true)).collect(),
            nodes_falsenodeids: self.splits.iter().map(|s| self.node_id(s.on_false)).collect(),
            nodes_weights: self.leaves.iter().map(|l| l.weight).collect(),
            nodes_classids: self.leaves.iter().map(|l| l.class).collect(),
            tree_root_ids: self.roots.iter().map(|&r| self.node_id(r)).collect(),
            ..EnsembleModel::default()
        }
        .with_counts()
    }

    fn score(&self, features: &[f32]) -> Vec<f32> {
        let mut scores = vec![0.0; self.output_width];
        for &root in &self.roots {
            let mut node = root;
            loop {
                match node {
                    Child::Split(i) => {
                        let split = &self.splits[i];
                        node = if features[usize::from(split.feature)] <= split.threshold {
                            split.on_true
                        } else {
                            split.on_false
                        };
                    }
                    Child::Leaf(i) => {
                        let leaf = &self.leaves[i];
                        scores[usize::from(leaf.class)] += leaf.weight;
                        break;
                    }
                }
            }
        }
        scores
    }

    /// Mostly uniform values, with some NaNs and some exact thresholds so
    /// ties are exercised.
    fn features(&self, rng: &mut Xoshiro256PlusPlus) -> Vec<f32> {
        (0..self.input_width)
            .map(|_| match rng.gen_range(0..10) {
                0 => f32::NAN,
                1 | 2 if !self.splits.is_empty() => {
                    self.splits[rng.gen_range(0..self.splits.len())].threshold
                }
                _ => rng.gen_range(-1.5..1.5),
            })
            .collect()
    }
}

/// Anything that validates must evaluate without panicking or looping.
fn load_validate_evaluate(bytes: &[u8]) {
    let Ok(descriptor) = ModelDescriptor::from_bytes(bytes) else {
        return;
    };
    let Ok(model) = descriptor.validate_widths(3, 3) else {
        return;
    };
    let mut scores = [0.0; 3];
    model.evaluate(&[0.0, -1.0, f32::NAN], &mut scores);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn random_forests_match_reference_walk(seed in any::<u64>()) {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let forest = Forest::random(&mut rng);
        let bytes = forest.to_model().to_bytes();
        let model = ModelDescriptor::from_bytes(&bytes)
            .unwrap()
            .validate_widths(forest.input_width, forest.output_width)
            .unwrap();
        prop_assert!(model.max_depth().unwrap() <= MAX_DEPTH);

        let mut scores = vec![0.0; forest.output_width];
        for _ in 0..16 {
            let features = forest.features(&mut rng);
            model.evaluate(&features, &mut scores);
            prop_assert_eq!(&scores, &forest.score(&features), "features {:?}", features);
        }
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        load_validate_evaluate(&bytes);
    }

    #[test]
    fn mutated_models_never_panic(
        edits in prop::collection::vec((any::<prop::sample::Index>(), any::<u8>()), 1..8),
    ) {
        let mut bytes = common::two_trees().to_bytes();
        for (at, value) in edits {
            let at = at.index(bytes.len());
            bytes[at] = value;
        }
        load_validate_evaluate(&bytes);
    }

    #[test]
    fn truncated_models_never_panic(cut in any::<prop::sample::Index>()) {
        let bytes = common::two_trees().to_bytes();
        let at = cut.index(bytes.len());
        load_validate_evaluate(&bytes[at..]);
        load_validate_evaluate(&bytes[..at]);
    }
}
