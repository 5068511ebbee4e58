//! Min-max scaling fitted jointly over train and test rows

use botbid_types::CsrMatrix;
use tracing::{info, warn};

use crate::errors::{FeatureError, Result};

/// Per-column min/max bounds
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit on the union of every row set given. Uses no labels.
    pub fn fit(partitions: &[&[Vec<f64>]], n_cols: usize) -> Result<Self> {
        let mut mins = vec![f64::INFINITY; n_cols];
        let mut maxs = vec![f64::NEG_INFINITY; n_cols];

        for rows in partitions {
            for row in rows.iter() {
                if row.len() != n_cols {
                    return Err(FeatureError::WidthMismatch {
                        expected: n_cols,
                        actual: row.len(),
                    });
                }
                for (i, &v) in row.iter().enumerate() {
                    mins[i] = mins[i].min(v);
                    maxs[i] = maxs[i].max(v);
                }
            }
        }

        let constant = mins.iter().zip(&maxs).filter(|(lo, hi)| lo >= hi).count();
        if constant > 0 {
            warn!("{} numeric columns are constant and scale to 0", constant);
        }
        info!("Fitted min-max scaler over {} columns", n_cols);

        Ok(Self { mins, maxs })
    }

    pub fn n_cols(&self) -> usize {
        self.mins.len()
    }

    /// Scale one value of column `col` into [0, 1]
    pub fn scale_value(&self, col: usize, value: f64) -> f64 {
        let (lo, hi) = (self.mins[col], self.maxs[col]);
        if hi > lo {
            ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Scale rows into a sparse matrix
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<CsrMatrix> {
        let scaled: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| {
                if row.len() != self.n_cols() {
                    return Err(FeatureError::WidthMismatch {
                        expected: self.n_cols(),
                        actual: row.len(),
                    });
                }
                Ok(row
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| self.scale_value(i, v))
                    .collect())
            })
            .collect::<Result<_>>()?;
        Ok(CsrMatrix::from_dense(&scaled, self.n_cols())?)
    }
}
