//! Ensemble evaluation.
//!
//! Nothing here allocates or fails. Every index the traversal touches was
//! bounds checked when the [`ValidatedModel`] was built, so the hot loop
//! reads without bounds checks.

use crate::ValidatedModel;

impl ValidatedModel<'_> {
    /// Scores one feature vector.
    ///
    /// `scores` is zeroed, then every tree is walked from its root: at an
    /// internal node the walk takes the true branch when
    /// `features[feature_id] <= threshold` and the false branch otherwise
    /// (so a NaN feature goes false). The weight of the leaf reached is added
    /// to `scores[class_id]`.
    ///
    /// # Panics
    ///
    /// Panics if `features.len()` is not [`input_width`](Self::input_width) or
    /// `scores.len()` is not [`output_width`](Self::output_width).
    pub fn evaluate(&self, features: &[f32], scores: &mut [f32]) {
        assert_eq!(
            features.len(),
            self.input_width,
            "feature vector length does not match the validated input width"
        );
        assert_eq!(
            scores.len(),
            self.output_width,
            "score vector length does not match the validated output width"
        );
        self.accumulate(features, scores);
    }

    /// Scores `rows.len() / input_width` feature vectors laid out back to
    /// back, writing `output_width` scores per row.
    ///
    /// # Panics
    ///
    /// Panics if `input_width` is zero, if `rows` is not a whole number of
    /// rows, or if `scores` does not hold exactly one score vector per row.
    pub fn evaluate_batch(&self, rows: &[f32], scores: &mut [f32]) {
        assert!(self.input_width > 0, "batch evaluation needs a non-zero input width");
        assert_eq!(
            rows.len() % self.input_width,
            0,
            "feature buffer is not a whole number of rows"
        );
        let num_rows = rows.len() / self.input_width;
        assert_eq!(
            scores.len(),
            num_rows * self.output_width,
            "score buffer does not match the number of rows"
        );
        if self.output_width == 0 {
            return;
        }
        for (features, out) in rows
            .chunks_exact(self.input_width)
            .zip(scores.chunks_exact_mut(self.output_width))
        {
            self.accumulate(features, out);
        }
    }

    /// Caller guarantees `features.len() == input_width` and
    /// `scores.len() == output_width`.
    #[inline]
    fn accumulate(&self, features: &[f32], scores: &mut [f32]) {
        scores.fill(0.0);
        let model = &self.model;
        for root in model.tree_root_ids.iter() {
            let leaf = self.leaf_for(root as usize, features);
            // SAFETY: `leaf_for` returns `cursor - num_internal_nodes` for a
            // cursor in `[num_internal_nodes, num_nodes)`, so `leaf <
            // num_leaf_nodes`, the validated length of both leaf arrays. Class
            // ids were checked against `output_width == scores.len()`.
            unsafe {
                let weight = model.nodes_weights.get_unchecked(leaf);
                let class = model.nodes_classids.get_unchecked(leaf) as usize;
                *scores.get_unchecked_mut(class) += weight;
            }
        }
    }

    /// Walks one tree from `root` and returns the leaf-local index reached.
    #[inline]
    fn leaf_for(&self, root: usize, features: &[f32]) -> usize {
        let model = &self.model;
        let internal = model.num_internal_nodes as usize;
        let mut cursor = root;
        while cursor < internal {
            // SAFETY: `cursor < num_internal_nodes`, the validated length of
            // every per-internal-node array. Feature ids are below
            // `input_width == features.len()`, and both targets are below
            // `num_nodes`, which keeps the post-loop subtraction in range.
            unsafe {
                let threshold = model.nodes_values.get_unchecked(cursor);
                let feature = model.nodes_featureids.get_unchecked(cursor) as usize;
                let next = if *features.get_unchecked(feature) <= threshold {
                    model.nodes_truenodeids.get_unchecked(cursor)
                } else {
                    model.nodes_falsenodeids.get_unchecked(cursor)
                };
                cursor = usize::from(next);
            }
        }
        cursor - internal
    }
}
