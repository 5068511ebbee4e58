//! Compressed sparse row matrix
//!
//! Row-major sparse storage with sorted column indices per row. Explicit
//! zeros are never stored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("row count mismatch: expected {expected}, got {actual}")]
    RowMismatch { expected: usize, actual: usize },

    #[error("row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("column index {index} out of bounds for {n_cols} columns")]
    ColumnOutOfBounds { index: usize, n_cols: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrMatrix {
    /// Empty matrix with `n_rows` rows and no columns
    pub fn empty(n_rows: usize) -> Self {
        Self {
            n_rows,
            n_cols: 0,
            indptr: vec![0; n_rows + 1],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Build from dense rows; every row must have `n_cols` entries
    pub fn from_dense(rows: &[Vec<f64>], n_cols: usize) -> Result<Self, MatrixError> {
        let mut builder = CsrBuilder::new(n_cols);
        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(MatrixError::RaggedRow {
                    row: row_idx,
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            builder.push_row(row.iter().copied().enumerate())?;
        }
        Ok(builder.finish())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Non-zero entries of one row as `(column, value)` pairs, columns ascending
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.indptr[row]..self.indptr[row + 1];
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.data[range].iter().copied())
    }

    /// Value at `(row, col)`, zero when not stored
    pub fn get(&self, row: usize, col: usize) -> f64 {
        let range = self.indptr[row]..self.indptr[row + 1];
        match self.indices[range.clone()].binary_search(&col) {
            Ok(pos) => self.data[range.start + pos],
            Err(_) => 0.0,
        }
    }

    /// Smallest stored value, or `None` for an all-zero matrix
    pub fn min_stored(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::min)
    }

    /// Concatenate matrices column-wise; all must have the same row count
    pub fn hstack(blocks: &[&CsrMatrix]) -> Result<Self, MatrixError> {
        let n_rows = blocks.first().map(|b| b.n_rows).unwrap_or(0);
        for block in blocks {
            if block.n_rows != n_rows {
                return Err(MatrixError::RowMismatch {
                    expected: n_rows,
                    actual: block.n_rows,
                });
            }
        }

        let n_cols = blocks.iter().map(|b| b.n_cols).sum();
        let mut builder = CsrBuilder::new(n_cols);
        for row in 0..n_rows {
            let mut offset = 0;
            let mut entries = Vec::new();
            for block in blocks {
                entries.extend(block.row(row).map(|(col, value)| (col + offset, value)));
                offset += block.n_cols;
            }
            builder.push_row(entries)?;
        }
        Ok(builder.finish())
    }

    /// Keep only the given columns, renumbered in the order given
    pub fn select_columns(&self, columns: &[usize]) -> Result<Self, MatrixError> {
        let mut remap = vec![usize::MAX; self.n_cols];
        for (new_idx, &old_idx) in columns.iter().enumerate() {
            if old_idx >= self.n_cols {
                return Err(MatrixError::ColumnOutOfBounds {
                    index: old_idx,
                    n_cols: self.n_cols,
                });
            }
            remap[old_idx] = new_idx;
        }

        let mut builder = CsrBuilder::new(columns.len());
        for row in 0..self.n_rows {
            let mut entries: Vec<(usize, f64)> = self
                .row(row)
                .filter(|(col, _)| remap[*col] != usize::MAX)
                .map(|(col, value)| (remap[col], value))
                .collect();
            entries.sort_by_key(|(col, _)| *col);
            builder.push_row(entries)?;
        }
        Ok(builder.finish())
    }

    /// Dense copy of one row
    pub fn dense_row(&self, row: usize) -> Vec<f64> {
        let mut dense = vec![0.0; self.n_cols];
        for (col, value) in self.row(row) {
            dense[col] = value;
        }
        dense
    }
}

/// Incremental row-by-row CSR construction
#[derive(Debug)]
pub struct CsrBuilder {
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<f64>,
}

impl CsrBuilder {
    pub fn new(n_cols: usize) -> Self {
        Self {
            n_cols,
            indptr: vec![0],
            indices: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Append a row; entries must be in ascending column order. Zeros are dropped.
    pub fn push_row<I>(&mut self, entries: I) -> Result<(), MatrixError>
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        for (col, value) in entries {
            if col >= self.n_cols {
                return Err(MatrixError::ColumnOutOfBounds {
                    index: col,
                    n_cols: self.n_cols,
                });
            }
            if value != 0.0 {
                self.indices.push(col);
                self.data.push(value);
            }
        }
        self.indptr.push(self.indices.len());
        Ok(())
    }

    pub fn finish(self) -> CsrMatrix {
        CsrMatrix {
            n_rows: self.indptr.len() - 1,
            n_cols: self.n_cols,
            indptr: self.indptr,
            indices: self.indices,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix {
        CsrMatrix::from_dense(&[vec![1.0, 0.0, 2.0], vec![0.0, 0.0, 3.0]], 3).unwrap()
    }

    #[test]
    fn test_from_dense_drops_zeros() {
        let m = sample();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.get(0, 2), 2.0);
        assert_eq!(m.get(1, 0), 0.0);
    }

    #[test]
    fn test_hstack_offsets_columns() {
        let a = sample();
        let b = CsrMatrix::from_dense(&[vec![4.0], vec![0.0]], 1).unwrap();
        let stacked = CsrMatrix::hstack(&[&a, &b]).unwrap();
        assert_eq!(stacked.n_cols(), 4);
        assert_eq!(stacked.dense_row(0), vec![1.0, 0.0, 2.0, 4.0]);
        assert_eq!(stacked.dense_row(1), vec![0.0, 0.0, 3.0, 0.0]);
    }

    #[test]
    fn test_hstack_rejects_row_mismatch() {
        let a = sample();
        let b = CsrMatrix::empty(3);
        assert_eq!(
            CsrMatrix::hstack(&[&a, &b]),
            Err(MatrixError::RowMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_select_columns() {
        let m = sample();
        let selected = m.select_columns(&[0, 2]).unwrap();
        assert_eq!(selected.n_cols(), 2);
        assert_eq!(selected.dense_row(0), vec![1.0, 2.0]);
        assert_eq!(selected.dense_row(1), vec![0.0, 3.0]);
        assert!(m.select_columns(&[5]).is_err());
    }
}
