//! Gradient Boosted Decision Tree (GBDT) trainer
//!
//! Logistic-loss boosting with per-tree row and column subsampling. All
//! randomness comes from one seeded ChaCha stream per model.

use botbid_model::{sigmoid, GbdtModel, ModelMetadata};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cart::{eval_binned, CartBuilder, TreeConfig};
use crate::dataset::Dataset;
use crate::deterministic::{sample_indices, seeded_rng};
use crate::errors::{Result, TrainerError};

/// Probability clamp used for the base margin and hessians
const PROB_EPSILON: f64 = 1e-6;
const MIN_HESSIAN: f64 = 1e-16;

/// GBDT training configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GbdtConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// L2 leaf regularization
    pub lambda: f64,
    /// Minimum split gain
    pub gamma: f64,
    pub min_child_weight: f64,
    /// Row fraction drawn per tree
    pub subsample: f64,
    /// Column fraction drawn per tree
    pub colsample: f64,
    pub max_bins: usize,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            num_trees: 100,
            max_depth: 3,
            learning_rate: 0.1,
            lambda: 1.0,
            gamma: 0.5,
            min_child_weight: 1.0,
            subsample: 0.9,
            colsample: 0.5,
            max_bins: 64,
        }
    }
}

impl GbdtConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_trees == 0 {
            return Err(TrainerError::InvalidParams("num_trees must be positive".into()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(TrainerError::InvalidParams(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.lambda >= 0.0) || !(self.gamma >= 0.0) || !(self.min_child_weight >= 0.0) {
            return Err(TrainerError::InvalidParams(
                "lambda, gamma and min_child_weight must be non-negative".into(),
            ));
        }
        for (name, fraction) in [("subsample", self.subsample), ("colsample", self.colsample)] {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(TrainerError::InvalidParams(format!(
                    "{} must be in (0, 1], got {}",
                    name, fraction
                )));
            }
        }
        if self.max_bins < 2 || self.max_bins > usize::from(u16::MAX) {
            return Err(TrainerError::InvalidParams(format!(
                "max_bins must be in 2..=65535, got {}",
                self.max_bins
            )));
        }
        Ok(())
    }

    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            lambda: self.lambda,
            gamma: self.gamma,
            min_child_weight: self.min_child_weight,
            learning_rate: self.learning_rate,
        }
    }
}

/// GBDT trainer
pub struct GbdtTrainer {
    config: GbdtConfig,
}

impl GbdtTrainer {
    pub fn new(config: GbdtConfig) -> Self {
        Self { config }
    }

    /// Train a GBDT model on the given dataset
    pub fn train(&self, dataset: &Dataset, seed: u64) -> Result<GbdtModel> {
        self.config.validate()?;
        if dataset.is_empty() {
            return Err(TrainerError::Dataset("dataset is empty".into()));
        }

        let n_samples = dataset.len();
        let feature_count = dataset.feature_count();
        let tree_config = self.config.tree_config();
        let mut rng = seeded_rng(seed);

        let base_margin = base_margin(dataset.positive_rate());
        let mut margins = vec![base_margin; n_samples];
        let mut trees = Vec::with_capacity(self.config.num_trees);

        for tree_idx in 0..self.config.num_trees {
            let (gradients, hessians) = logistic_gradients(&dataset.targets, &margins);

            let rows = sample_indices(&mut rng, n_samples, self.config.subsample);
            let features = sample_indices(&mut rng, feature_count, self.config.colsample);

            let tree = CartBuilder::new(dataset, &gradients, &hessians, &features, &tree_config)
                .build(&rows);

            for (row, margin) in margins.iter_mut().enumerate() {
                *margin += eval_binned(&tree, dataset, row);
            }

            debug!(
                "seed {} tree {}/{}: {} rows, {} features, {} leaves",
                seed,
                tree_idx + 1,
                self.config.num_trees,
                rows.len(),
                features.len(),
                tree.leaf_count()
            );
            trees.push(tree);
        }

        Ok(GbdtModel {
            metadata: ModelMetadata {
                seed,
                feature_count,
                tree_count: trees.len(),
                max_depth: self.config.max_depth,
            },
            trees,
            base_margin,
        })
    }
}

/// Log-odds of the clamped positive rate
fn base_margin(positive_rate: f64) -> f64 {
    let p = positive_rate.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON);
    (p / (1.0 - p)).ln()
}

/// Logistic loss derivatives: `g = p - y`, `h = p (1 - p)`
fn logistic_gradients(targets: &[f64], margins: &[f64]) -> (Vec<f64>, Vec<f64>) {
    targets
        .iter()
        .zip(margins)
        .map(|(&y, &m)| {
            let p = sigmoid(m);
            (p - y, (p * (1.0 - p)).max(MIN_HESSIAN))
        })
        .unzip()
}
