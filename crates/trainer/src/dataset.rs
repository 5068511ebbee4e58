//! Binned training dataset
//!
//! Quantizes every feature of a sparse matrix once into at most `max_bins`
//! ordered bins. Rows keep only their non-zero entries; the bin holding 0.0
//! is implied for every feature a row does not store.

use botbid_types::CsrMatrix;
use tracing::debug;

use crate::errors::{Result, TrainerError};

/// Training dataset with quantized features and binary targets
#[derive(Clone, Debug)]
pub struct Dataset {
    n_rows: usize,
    feature_count: usize,
    /// Ascending bin upper bounds per feature
    cuts: Vec<Vec<f64>>,
    /// Bin of value 0.0 per feature
    zero_bins: Vec<usize>,
    /// Start of each feature's bins in a flat histogram
    bin_offsets: Vec<usize>,
    /// Non-zero `(feature, bin)` entries per row, features ascending
    rows: Vec<Vec<(u32, u16)>>,
    pub targets: Vec<f64>,
}

impl Dataset {
    /// Quantize `matrix` against 0/1 `targets`
    pub fn from_matrix(matrix: &CsrMatrix, targets: &[f64], max_bins: usize) -> Result<Self> {
        if matrix.n_rows() == 0 {
            return Err(TrainerError::Dataset("dataset is empty".into()));
        }
        if targets.len() != matrix.n_rows() {
            return Err(TrainerError::Dataset(format!(
                "expected {} targets, got {}",
                matrix.n_rows(),
                targets.len()
            )));
        }
        if let Some(t) = targets.iter().find(|&&t| t != 0.0 && t != 1.0) {
            return Err(TrainerError::Dataset(format!("target {} is not 0 or 1", t)));
        }
        if !(2..=usize::from(u16::MAX)).contains(&max_bins) {
            return Err(TrainerError::InvalidParams(format!(
                "max_bins must be in 2..=65535, got {}",
                max_bins
            )));
        }

        let n_rows = matrix.n_rows();
        let feature_count = matrix.n_cols();

        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); feature_count];
        for row in 0..n_rows {
            for (col, value) in matrix.row(row) {
                columns[col].push(value);
            }
        }

        let cuts: Vec<Vec<f64>> = columns
            .into_iter()
            .map(|values| compute_cuts(values, n_rows, max_bins))
            .collect();
        let zero_bins = cuts.iter().map(|c| bin_of(c, 0.0)).collect();

        let mut bin_offsets = Vec::with_capacity(feature_count + 1);
        let mut offset = 0;
        for c in &cuts {
            bin_offsets.push(offset);
            offset += c.len();
        }
        bin_offsets.push(offset);

        let rows = (0..n_rows)
            .map(|row| {
                matrix
                    .row(row)
                    .map(|(col, value)| (col as u32, bin_of(&cuts[col], value) as u16))
                    .collect()
            })
            .collect();

        debug!(
            "Binned {} rows x {} features into {} bins",
            n_rows, feature_count, offset
        );

        Ok(Self {
            n_rows,
            feature_count,
            cuts,
            zero_bins,
            bin_offsets,
            rows,
            targets: targets.to_vec(),
        })
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn bin_count(&self, feature: usize) -> usize {
        self.cuts[feature].len()
    }

    pub fn total_bins(&self) -> usize {
        self.bin_offsets[self.feature_count]
    }

    pub fn bin_offset(&self, feature: usize) -> usize {
        self.bin_offsets[feature]
    }

    pub fn zero_bin(&self, feature: usize) -> usize {
        self.zero_bins[feature]
    }

    /// Upper bound of `bin`; rows with `x <= threshold(feature, bin)` fall at or below it
    pub fn threshold(&self, feature: usize, bin: usize) -> f64 {
        self.cuts[feature][bin]
    }

    pub fn row_entries(&self, row: usize) -> &[(u32, u16)] {
        &self.rows[row]
    }

    /// Bin of `feature` for `row`
    pub fn row_bin(&self, row: usize, feature: usize) -> usize {
        let entries = &self.rows[row];
        match entries.binary_search_by_key(&(feature as u32), |&(f, _)| f) {
            Ok(pos) => usize::from(entries[pos].1),
            Err(_) => self.zero_bins[feature],
        }
    }

    /// Fraction of positive targets
    pub fn positive_rate(&self) -> f64 {
        self.targets.iter().sum::<f64>() / self.n_rows as f64
    }

    /// (min, max) of the bin bounds per feature
    pub fn feature_stats(&self) -> Vec<(f64, f64)> {
        self.cuts
            .iter()
            .map(|c| {
                (
                    c.first().copied().unwrap_or(0.0),
                    c.last().copied().unwrap_or(0.0),
                )
            })
            .collect()
    }
}

/// Bin upper bounds for one feature. `values` are the stored non-zeros; the
/// remaining `n_rows - values.len()` rows are zero.
fn compute_cuts(mut values: Vec<f64>, n_rows: usize, max_bins: usize) -> Vec<f64> {
    values.resize(n_rows, 0.0);
    values.sort_by(f64::total_cmp);

    let mut distinct = values.clone();
    distinct.dedup();
    if distinct.len() <= max_bins {
        return distinct;
    }

    let n = values.len();
    let mut cuts: Vec<f64> = (1..=max_bins)
        .map(|i| values[(i * n).div_ceil(max_bins) - 1])
        .collect();
    cuts.dedup();
    cuts
}

/// First bin whose upper bound is `>= value`, clamped to the last bin
fn bin_of(cuts: &[f64], value: f64) -> usize {
    cuts.partition_point(|&c| c < value)
        .min(cuts.len().saturating_sub(1))
}
