//! Gradient boosted decision tree ensemble for binary classification
//!
//! Trees are stored as flat node arrays. The ensemble output is a logit
//! margin: `base_margin` plus the sum of leaf values; the positive class
//! probability is its logistic transform.

use botbid_types::CsrMatrix;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::serialization::canonical_json_bytes;

/// A decision tree node (internal or leaf)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Feature index to compare (for internal nodes)
    pub feature_index: u32,
    /// Rows with `x <= threshold` go left
    pub threshold: f64,
    /// Index of left child node
    pub left: u32,
    /// Index of right child node
    pub right: u32,
    /// Leaf value (None for internal nodes, Some for leaves)
    pub value: Option<f64>,
}

impl Node {
    pub fn leaf(value: f64) -> Self {
        Self {
            feature_index: 0,
            threshold: 0.0,
            left: 0,
            right: 0,
            value: Some(value),
        }
    }

    pub fn split(feature_index: u32, threshold: f64) -> Self {
        Self {
            feature_index,
            threshold,
            left: 0,
            right: 0,
            value: None,
        }
    }
}

/// A single decision tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Tree {
    /// Nodes in depth-first order, root first
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.value.is_some()).count()
    }
}

/// Training provenance stored with a model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModelMetadata {
    pub seed: u64,
    pub feature_count: usize,
    pub tree_count: usize,
    pub max_depth: usize,
}

/// Complete GBDT model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GbdtModel {
    pub trees: Vec<Tree>,
    /// Initial logit before any tree
    pub base_margin: f64,
    pub metadata: ModelMetadata,
}

impl GbdtModel {
    /// Raw logit for a dense feature vector
    pub fn margin(&self, features: &[f64]) -> f64 {
        self.base_margin
            + self
                .trees
                .iter()
                .map(|tree| eval_tree(tree, features))
                .sum::<f64>()
    }

    /// Positive-class probability for a dense feature vector
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        sigmoid(self.margin(features))
    }

    /// Positive-class probability for every row of a matrix
    pub fn predict_proba_matrix(&self, matrix: &CsrMatrix) -> Result<Vec<f64>, ModelError> {
        if matrix.n_cols() != self.metadata.feature_count {
            return Err(ModelError::FeatureSizeMismatch {
                expected: self.metadata.feature_count,
                actual: matrix.n_cols(),
            });
        }
        Ok((0..matrix.n_rows())
            .map(|row| {
                let margin = self.base_margin
                    + self
                        .trees
                        .iter()
                        .map(|tree| {
                            walk(tree, |feature| {
                                (feature < matrix.n_cols()).then(|| matrix.get(row, feature))
                            })
                        })
                        .sum::<f64>();
                sigmoid(margin)
            })
            .collect())
    }

    /// BLAKE3 hex digest of the canonical JSON form
    pub fn model_hash(&self) -> Result<String, ModelError> {
        let bytes = canonical_json_bytes(self)?;
        Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
    }
}

/// Logistic function
pub fn sigmoid(margin: f64) -> f64 {
    1.0 / (1.0 + (-margin).exp())
}

/// Evaluate a single tree
///
/// # Arguments
/// * `tree` - Tree to evaluate
/// * `features` - Dense feature vector
///
/// # Returns
/// Leaf value for this tree; 0 for a malformed tree or a short vector
pub fn eval_tree(tree: &Tree, features: &[f64]) -> f64 {
    walk(tree, |feature| features.get(feature).copied())
}

/// Root-to-leaf walk; `lookup` yields the value of a feature index or `None`
/// when it is out of range
fn walk<F>(tree: &Tree, lookup: F) -> f64
where
    F: Fn(usize) -> Option<f64>,
{
    let mut idx = 0usize;

    loop {
        let Some(node) = tree.nodes.get(idx) else {
            return 0.0;
        };

        if let Some(value) = node.value {
            return value;
        }

        let Some(feature_value) = lookup(node.feature_index as usize) else {
            return 0.0;
        };

        idx = if feature_value <= node.threshold {
            node.left as usize
        } else {
            node.right as usize
        };
    }
}
