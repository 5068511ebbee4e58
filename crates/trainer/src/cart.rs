//! Histogram CART builder
//!
//! Grows one regression tree on logistic gradients over a binned dataset.
//! Histograms are accumulated over the stored non-zero entries; each
//! feature's zero bin is the node total minus its non-zero bins.

use botbid_model::{Node, Tree};
use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::deterministic::SplitTieBreaker;

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    /// L2 regularization on leaf values
    pub lambda: f64,
    /// Minimum split gain
    pub gamma: f64,
    /// Minimum hessian sum per child
    pub min_child_weight: f64,
    /// Shrinkage applied to every leaf
    pub learning_rate: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            lambda: 1.0,
            gamma: 0.5,
            min_child_weight: 1.0,
            learning_rate: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct GradPair {
    grad: f64,
    hess: f64,
}

impl GradPair {
    fn add(&mut self, other: GradPair) {
        self.grad += other.grad;
        self.hess += other.hess;
    }

    fn sub(self, other: GradPair) -> GradPair {
        GradPair {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
        }
    }
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    gain: f64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, bin: usize, gain: f64) -> Self {
        Self {
            gain,
            tie_breaker: SplitTieBreaker::new(feature_idx, bin),
        }
    }

    /// Higher gain wins; equal gains go to the lower `(feature, bin)`
    fn better(self, other: Self) -> Self {
        if other.gain > self.gain
            || (other.gain == self.gain && other.tie_breaker < self.tie_breaker)
        {
            other
        } else {
            self
        }
    }
}

/// Build a regression tree over a subset of rows and features
pub struct CartBuilder<'a> {
    config: &'a TreeConfig,
    dataset: &'a Dataset,
    gradients: &'a [f64],
    hessians: &'a [f64],
    /// Sampled features, ascending
    features: &'a [usize],
    feature_mask: Vec<bool>,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        dataset: &'a Dataset,
        gradients: &'a [f64],
        hessians: &'a [f64],
        features: &'a [usize],
        config: &'a TreeConfig,
    ) -> Self {
        debug_assert_eq!(dataset.len(), gradients.len());
        debug_assert_eq!(dataset.len(), hessians.len());

        let mut feature_mask = vec![false; dataset.feature_count()];
        for &f in features {
            feature_mask[f] = true;
        }

        Self {
            config,
            dataset,
            gradients,
            hessians,
            features,
            feature_mask,
        }
    }

    /// Build tree over `rows` and return it
    pub fn build(&self, rows: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(rows, 0, &mut nodes);
        Tree { nodes }
    }

    /// Recursively build tree nodes
    fn build_node(&self, rows: &[usize], depth: usize, nodes: &mut Vec<Node>) -> u32 {
        let current_idx = nodes.len() as u32;
        let total = self.sum_rows(rows);

        let split = if depth < self.config.max_depth
            && total.hess >= 2.0 * self.config.min_child_weight
        {
            self.find_best_split(rows, total)
        } else {
            None
        };

        let Some(split) = split else {
            nodes.push(Node::leaf(self.leaf_value(total)));
            return current_idx;
        };

        let SplitTieBreaker { feature_idx, bin } = split.tie_breaker;
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&row| self.dataset.row_bin(row, feature_idx) <= bin);

        // Reserve space for current node
        nodes.push(Node::split(
            feature_idx as u32,
            self.dataset.threshold(feature_idx, bin),
        ));

        let left = self.build_node(&left_rows, depth + 1, nodes);
        let right = self.build_node(&right_rows, depth + 1, nodes);

        nodes[current_idx as usize].left = left;
        nodes[current_idx as usize].right = right;

        current_idx
    }

    /// Best split over the sampled features, or `None` when no split has
    /// positive gain with both children above the minimum hessian
    fn find_best_split(&self, rows: &[usize], total: GradPair) -> Option<SplitCandidate> {
        let histogram = self.build_histogram(rows, total);

        self.features
            .par_iter()
            .filter_map(|&feature_idx| self.best_split_for_feature(&histogram, feature_idx, total))
            .reduce_with(SplitCandidate::better)
    }

    fn best_split_for_feature(
        &self,
        histogram: &[GradPair],
        feature_idx: usize,
        total: GradPair,
    ) -> Option<SplitCandidate> {
        let offset = self.dataset.bin_offset(feature_idx);
        let bins = self.dataset.bin_count(feature_idx);
        let parent_score = self.score(total);

        let mut best: Option<SplitCandidate> = None;
        let mut left = GradPair::default();

        // Splitting after the last bin sends everything left
        for bin in 0..bins.saturating_sub(1) {
            left.add(histogram[offset + bin]);
            let right = total.sub(left);

            if left.hess < self.config.min_child_weight
                || right.hess < self.config.min_child_weight
            {
                continue;
            }

            let gain =
                0.5 * (self.score(left) + self.score(right) - parent_score) - self.config.gamma;
            if gain <= 0.0 {
                continue;
            }

            let candidate = SplitCandidate::new(feature_idx, bin, gain);
            best = Some(match best {
                None => candidate,
                Some(current) => current.better(candidate),
            });
        }

        best
    }

    /// Per-bin gradient sums for the sampled features over `rows`
    fn build_histogram(&self, rows: &[usize], total: GradPair) -> Vec<GradPair> {
        let mut histogram = vec![GradPair::default(); self.dataset.total_bins()];

        for &row in rows {
            let pair = GradPair {
                grad: self.gradients[row],
                hess: self.hessians[row],
            };
            for &(feature, bin) in self.dataset.row_entries(row) {
                let feature = feature as usize;
                if self.feature_mask[feature] {
                    histogram[self.dataset.bin_offset(feature) + usize::from(bin)].add(pair);
                }
            }
        }

        for &feature in self.features {
            let offset = self.dataset.bin_offset(feature);
            let bins = self.dataset.bin_count(feature);
            let zero_bin = self.dataset.zero_bin(feature);

            let mut stored = GradPair::default();
            for bin in (0..bins).filter(|&b| b != zero_bin) {
                stored.add(histogram[offset + bin]);
            }
            histogram[offset + zero_bin] = total.sub(stored);
        }

        histogram
    }

    fn sum_rows(&self, rows: &[usize]) -> GradPair {
        let mut total = GradPair::default();
        for &row in rows {
            total.add(GradPair {
                grad: self.gradients[row],
                hess: self.hessians[row],
            });
        }
        total
    }

    /// `G² / (H + λ)`
    fn score(&self, pair: GradPair) -> f64 {
        pair.grad * pair.grad / (pair.hess + self.config.lambda)
    }

    /// Shrunk optimal leaf weight `-G / (H + λ) * η`
    fn leaf_value(&self, pair: GradPair) -> f64 {
        -pair.grad / (pair.hess + self.config.lambda) * self.config.learning_rate
    }
}

/// Evaluate a tree on a training row using its bins
///
/// Thresholds are bin upper bounds, so comparing a row's own bin bound
/// reproduces `x <= threshold` exactly for every training value.
pub fn eval_binned(tree: &Tree, dataset: &Dataset, row: usize) -> f64 {
    let mut idx = 0usize;

    loop {
        let Some(node) = tree.nodes.get(idx) else {
            return 0.0;
        };

        if let Some(value) = node.value {
            return value;
        }

        let feature = node.feature_index as usize;
        let bound = dataset.threshold(feature, dataset.row_bin(row, feature));
        idx = if bound <= node.threshold {
            node.left as usize
        } else {
            node.right as usize
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botbid_model::eval_tree;
    use botbid_types::CsrMatrix;

    fn dataset(rows: &[Vec<f64>], targets: &[f64]) -> Dataset {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let matrix = CsrMatrix::from_dense(rows, width).unwrap();
        Dataset::from_matrix(&matrix, targets, 64).unwrap()
    }

    fn config() -> TreeConfig {
        TreeConfig {
            max_depth: 2,
            lambda: 1.0,
            gamma: 0.0,
            min_child_weight: 0.5,
            learning_rate: 1.0,
        }
    }

    #[test]
    fn test_simple_split() {
        let rows = vec![vec![0.0], vec![0.1], vec![0.9], vec![1.0]];
        let ds = dataset(&rows, &[0.0, 0.0, 1.0, 1.0]);
        let gradients = vec![0.5, 0.5, -0.5, -0.5];
        let hessians = vec![0.25; 4];
        let cfg = config();
        let features = [0];

        let tree = CartBuilder::new(&ds, &gradients, &hessians, &features, &cfg).build(&[0, 1, 2, 3]);

        assert!(tree.nodes[0].value.is_none());
        assert_eq!(tree.nodes[0].feature_index, 0);
        assert_eq!(tree.nodes[0].threshold, 0.1);
        assert!(eval_tree(&tree, &[0.0]) < 0.0);
        assert!(eval_tree(&tree, &[1.0]) > 0.0);
        for (row, values) in rows.iter().enumerate() {
            assert_eq!(eval_binned(&tree, &ds, row), eval_tree(&tree, values));
        }
    }

    #[test]
    fn test_gamma_blocks_weak_splits() {
        let ds = dataset(&[vec![0.0], vec![1.0]], &[0.0, 1.0]);
        let gradients = vec![0.5, -0.5];
        let hessians = vec![0.25; 2];
        let cfg = TreeConfig {
            gamma: 10.0,
            min_child_weight: 0.1,
            ..config()
        };
        let features = [0];

        let tree = CartBuilder::new(&ds, &gradients, &hessians, &features, &cfg).build(&[0, 1]);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].value, Some(0.0));
    }

    #[test]
    fn test_min_child_weight_makes_leaf() {
        let ds = dataset(&[vec![0.0], vec![1.0]], &[0.0, 1.0]);
        let gradients = vec![0.5, -0.5];
        let hessians = vec![0.25; 2];
        let cfg = TreeConfig {
            min_child_weight: 1.0,
            ..config()
        };
        let features = [0];

        let tree = CartBuilder::new(&ds, &gradients, &hessians, &features, &cfg).build(&[0, 1]);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_unsampled_feature_is_ignored() {
        // Only feature 1 separates the targets but only feature 0 is sampled
        let rows = vec![
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        ];
        let ds = dataset(&rows, &[0.0, 0.0, 1.0, 1.0]);
        let gradients = vec![0.5, 0.5, -0.5, -0.5];
        let hessians = vec![0.25; 4];
        let cfg = config();

        let features = [0];
        let tree = CartBuilder::new(&ds, &gradients, &hessians, &features, &cfg).build(&[0, 1, 2, 3]);
        assert_eq!(tree.nodes.len(), 1);

        let features = [0, 1];
        let tree = CartBuilder::new(&ds, &gradients, &hessians, &features, &cfg).build(&[0, 1, 2, 3]);
        assert_eq!(tree.nodes[0].feature_index, 1);
    }

    #[test]
    fn test_equal_gain_prefers_lower_feature() {
        // Two identical columns
        let rows = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0], vec![1.0, 1.0]];
        let ds = dataset(&rows, &[0.0, 1.0, 0.0, 1.0]);
        let gradients = vec![0.5, -0.5, 0.5, -0.5];
        let hessians = vec![0.25; 4];
        let cfg = config();
        let features = [0, 1];

        let tree = CartBuilder::new(&ds, &gradients, &hessians, &features, &cfg).build(&[0, 1, 2, 3]);
        assert_eq!(tree.nodes[0].feature_index, 0);
    }
}
