//! Chi-squared univariate feature selection

use botbid_types::{CsrMatrix, Label};
use std::cmp::Ordering;
use tracing::info;

use crate::errors::{FeatureError, Result};

/// Share of columns retained
pub const DEFAULT_PERCENTILE: f64 = 25.0;

/// Chi-squared statistic of every column against a binary label.
///
/// Observed counts are the per-class column sums; expected counts are the
/// class frequency times the column total. Columns with a zero total score NaN.
pub fn chi2_scores(matrix: &CsrMatrix, labels: &[Label]) -> Result<Vec<f64>> {
    if labels.len() != matrix.n_rows() {
        return Err(FeatureError::LabelMismatch {
            labels: labels.len(),
            rows: matrix.n_rows(),
        });
    }
    if let Some(min) = matrix.min_stored().filter(|&m| m < 0.0) {
        return Err(FeatureError::NegativeFeature(min));
    }

    let n_cols = matrix.n_cols();
    let mut observed = [vec![0.0; n_cols], vec![0.0; n_cols]];
    let mut class_counts = [0.0f64; 2];
    for (row, label) in labels.iter().enumerate() {
        let class = usize::from(label.is_robot());
        class_counts[class] += 1.0;
        for (col, value) in matrix.row(row) {
            observed[class][col] += value;
        }
    }

    let n = labels.len() as f64;
    let scores = (0..n_cols)
        .map(|col| {
            let total = observed[0][col] + observed[1][col];
            (0..2)
                .map(|class| {
                    let expected = class_counts[class] / n * total;
                    let diff = observed[class][col] - expected;
                    diff * diff / expected
                })
                .sum()
        })
        .collect();
    Ok(scores)
}

/// Number of columns kept out of `n_cols` for a percentile
pub fn retained_count(n_cols: usize, percentile: f64) -> usize {
    ((n_cols as f64) * percentile / 100.0).ceil() as usize
}

/// Chi-squared filter keeping the top `percentile` share of columns
#[derive(Debug, Clone, PartialEq)]
pub struct Chi2Selector {
    scores: Vec<f64>,
    selected: Vec<usize>,
}

impl Chi2Selector {
    /// Score the training matrix and pick exactly `ceil(n * percentile / 100)`
    /// columns. Higher scores win; ties and NaN scores go to the lower index,
    /// NaN ranks below every number.
    pub fn fit(matrix: &CsrMatrix, labels: &[Label], percentile: f64) -> Result<Self> {
        let scores = chi2_scores(matrix, labels)?;
        let keep = retained_count(scores.len(), percentile).min(scores.len());

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| rank(scores[a], scores[b]).then(a.cmp(&b)));
        let mut selected: Vec<usize> = order.into_iter().take(keep).collect();
        selected.sort_unstable();

        info!(
            "Chi-squared selection kept {} of {} columns",
            selected.len(),
            scores.len()
        );
        Ok(Self { scores, selected })
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Kept column indices, ascending
    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn transform(&self, matrix: &CsrMatrix) -> Result<CsrMatrix> {
        Ok(matrix.select_columns(&self.selected)?)
    }
}

/// Descending by score with NaN last
fn rank(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<Label> {
        vec![Label::Human, Label::Human, Label::Robot, Label::Robot]
    }

    fn matrix() -> CsrMatrix {
        // col 0 tracks the label, col 1 is uniform, col 2 is all zero,
        // col 3 is weakly informative
        CsrMatrix::from_dense(
            &[
                vec![0.0, 1.0, 0.0, 0.2],
                vec![0.0, 1.0, 0.0, 0.0],
                vec![1.0, 1.0, 0.0, 0.4],
                vec![1.0, 1.0, 0.0, 0.1],
            ],
            4,
        )
        .unwrap()
    }

    #[test]
    fn test_scores() {
        let scores = chi2_scores(&matrix(), &labels()).unwrap();
        assert!((scores[0] - 2.0).abs() < 1e-12);
        assert!(scores[1].abs() < 1e-12);
        assert!(scores[2].is_nan());
        assert!(scores[3] > 0.0 && scores[3] < scores[0]);
    }

    #[test]
    fn test_keeps_ceil_quarter() {
        assert_eq!(retained_count(4, 25.0), 1);
        assert_eq!(retained_count(5, 25.0), 2);
        assert_eq!(retained_count(0, 25.0), 0);

        let selector = Chi2Selector::fit(&matrix(), &labels(), 25.0).unwrap();
        assert_eq!(selector.selected(), &[0]);

        let selector = Chi2Selector::fit(&matrix(), &labels(), 50.0).unwrap();
        assert_eq!(selector.selected(), &[0, 3]);
    }

    #[test]
    fn test_same_columns_for_any_matrix() {
        let selector = Chi2Selector::fit(&matrix(), &labels(), 50.0).unwrap();
        let other = CsrMatrix::from_dense(&[vec![9.0, 8.0, 7.0, 6.0]], 4).unwrap();
        let reduced = selector.transform(&other).unwrap();
        assert_eq!(reduced.dense_row(0), vec![9.0, 6.0]);
    }

    #[test]
    fn test_negative_values_rejected() {
        let m = CsrMatrix::from_dense(&[vec![-1.0], vec![1.0], vec![0.0], vec![0.0]], 1).unwrap();
        assert!(matches!(
            chi2_scores(&m, &labels()),
            Err(FeatureError::NegativeFeature(_))
        ));
    }

    #[test]
    fn test_label_count_checked() {
        assert!(chi2_scores(&matrix(), &labels()[..2]).is_err());
    }
}
