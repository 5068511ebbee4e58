//! Seed bagging
//!
//! Trains one GBDT per consecutive seed on the same matrix and averages the
//! members' positive-class probabilities. Members are trained in seed order;
//! the split search inside each member uses a dedicated rayon pool.

use botbid_model::GbdtModel;
use botbid_types::CsrMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::errors::{Result, TrainerError};
use crate::trainer::{GbdtConfig, GbdtTrainer};

/// Bag size and seeding
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaggingConfig {
    pub bag_size: usize,
    /// Seed of the first member; member `i` uses `first_seed + i`
    pub first_seed: u64,
    /// Worker threads for split search; 0 lets rayon decide
    pub threads: usize,
}

impl Default for BaggingConfig {
    fn default() -> Self {
        Self {
            bag_size: 15,
            first_seed: 1,
            threads: 0,
        }
    }
}

impl BaggingConfig {
    pub fn seeds(&self) -> impl Iterator<Item = u64> {
        let first = self.first_seed;
        (0..self.bag_size as u64).map(move |i| first + i)
    }
}

/// Ensemble of independently seeded GBDT models
#[derive(Clone, Debug)]
pub struct BaggedClassifier {
    members: Vec<GbdtModel>,
    member_hashes: Vec<String>,
}

impl BaggedClassifier {
    /// Fit every bag member on `matrix` against 0/1 `targets`
    pub fn fit(
        matrix: &CsrMatrix,
        targets: &[f64],
        gbdt: &GbdtConfig,
        bagging: &BaggingConfig,
    ) -> Result<Self> {
        if bagging.bag_size == 0 {
            return Err(TrainerError::InvalidParams("bag_size must be positive".into()));
        }
        gbdt.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(bagging.threads)
            .build()
            .map_err(|err| TrainerError::ThreadPool(err.to_string()))?;

        let dataset = Dataset::from_matrix(matrix, targets, gbdt.max_bins)?;
        info!(
            "Training {} bag members on {} rows x {} features ({} threads)",
            bagging.bag_size,
            dataset.len(),
            dataset.feature_count(),
            pool.current_num_threads()
        );
        let stats = dataset.feature_stats();
        let single_bound = stats.iter().filter(|(lo, hi)| lo >= hi).count();
        debug!(
            "{} of {} features quantize to a single bin bound",
            single_bound,
            stats.len()
        );

        let trainer = GbdtTrainer::new(gbdt.clone());
        let mut members = Vec::with_capacity(bagging.bag_size);
        let mut member_hashes = Vec::with_capacity(bagging.bag_size);

        for seed in bagging.seeds() {
            let model = pool.install(|| trainer.train(&dataset, seed))?;
            let hash = model.model_hash()?;
            debug!(
                "bag member seed {}: {} trees, {} leaves",
                seed,
                model.trees.len(),
                model.trees.iter().map(|t| t.leaf_count()).sum::<usize>()
            );
            info!("Model seed {} hash {}", seed, hash);
            members.push(model);
            member_hashes.push(hash);
        }

        Ok(Self {
            members,
            member_hashes,
        })
    }

    pub fn members(&self) -> &[GbdtModel] {
        &self.members
    }

    /// BLAKE3 hex digest per member, in seed order
    pub fn member_hashes(&self) -> &[String] {
        &self.member_hashes
    }

    /// Mean positive-class probability per row
    pub fn predict_proba(&self, matrix: &CsrMatrix) -> Result<Vec<f64>> {
        let mut sums = vec![0.0; matrix.n_rows()];
        for member in &self.members {
            for (sum, p) in sums.iter_mut().zip(member.predict_proba_matrix(matrix)?) {
                *sum += p;
            }
        }
        let n = self.members.len() as f64;
        Ok(sums.into_iter().map(|s| s / n).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (CsrMatrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![(i % 10) as f64 / 10.0, if i % 3 == 0 { 1.0 } else { 0.0 }])
            .collect();
        let targets = (0..30).map(|i| if i % 10 >= 5 { 1.0 } else { 0.0 }).collect();
        (CsrMatrix::from_dense(&rows, 2).unwrap(), targets)
    }

    fn small() -> GbdtConfig {
        GbdtConfig {
            num_trees: 5,
            ..GbdtConfig::default()
        }
    }

    #[test]
    fn test_seeds_are_consecutive() {
        let seeds: Vec<u64> = BaggingConfig::default().seeds().collect();
        assert_eq!(seeds, (1..=15).collect::<Vec<u64>>());
    }

    #[test]
    fn test_fit_and_average() {
        let (matrix, targets) = data();
        let bagging = BaggingConfig {
            bag_size: 3,
            threads: 2,
            ..BaggingConfig::default()
        };
        let bag = BaggedClassifier::fit(&matrix, &targets, &small(), &bagging).unwrap();
        assert_eq!(bag.members().len(), 3);
        assert_eq!(bag.member_hashes().len(), 3);

        let averaged = bag.predict_proba(&matrix).unwrap();
        let first = bag.members()[0].predict_proba_matrix(&matrix).unwrap();
        assert_eq!(averaged.len(), 30);
        assert!(averaged.iter().all(|p| (0.0..=1.0).contains(p)));

        let single = BaggedClassifier::fit(
            &matrix,
            &targets,
            &small(),
            &BaggingConfig {
                bag_size: 1,
                ..bagging
            },
        )
        .unwrap();
        assert_eq!(single.predict_proba(&matrix).unwrap(), first);
    }

    #[test]
    fn test_zero_bag_rejected() {
        let (matrix, targets) = data();
        let bagging = BaggingConfig {
            bag_size: 0,
            ..BaggingConfig::default()
        };
        assert!(BaggedClassifier::fit(&matrix, &targets, &small(), &bagging).is_err());
    }

    #[test]
    fn test_prediction_width_checked() {
        let (matrix, targets) = data();
        let bagging = BaggingConfig {
            bag_size: 1,
            ..BaggingConfig::default()
        };
        let bag = BaggedClassifier::fit(&matrix, &targets, &small(), &bagging).unwrap();
        let narrow = CsrMatrix::from_dense(&[vec![0.5]], 1).unwrap();
        assert!(bag.predict_proba(&narrow).is_err());
    }
}
