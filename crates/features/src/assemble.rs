//! Feature matrix assembly
//!
//! Partitions the joined table, scales the numeric block and appends one
//! TF-IDF block per included text column, in declaration order. Every
//! transform is fitted on train ∪ test so both matrices share one column space.

use botbid_types::{CsrMatrix, Label, TextColumn, TextColumnConfig};
use tracing::info;

use crate::errors::Result;
use crate::join::{JoinedTable, Partition};
use crate::scale::MinMaxScaler;
use crate::tfidf::fit_vectorizers;

/// Row-aligned train and test matrices with their shared column names
#[derive(Debug, Clone)]
pub struct FeatureMatrices {
    pub train_ids: Vec<String>,
    pub train_labels: Vec<Label>,
    pub train: CsrMatrix,
    pub test_ids: Vec<String>,
    pub test: CsrMatrix,
    pub column_names: Vec<String>,
}

impl FeatureMatrices {
    pub fn n_cols(&self) -> usize {
        self.column_names.len()
    }
}

/// Build the combined numeric + text matrices for both partitions
pub fn build_feature_matrices(
    table: JoinedTable,
    text_configs: &[TextColumnConfig],
) -> Result<FeatureMatrices> {
    let numeric_columns = table.numeric_columns.clone();
    let text_index: Vec<Option<usize>> = text_configs
        .iter()
        .map(|c| table.text_index(c.column))
        .collect();
    let (train, test) = table.partition();
    info!(
        "Partitioned actors: {} train, {} test",
        train.len(),
        test.len()
    );

    let train_numeric = train.numeric_rows();
    let test_numeric = test.numeric_rows();
    let scaler = MinMaxScaler::fit(
        &[train_numeric.as_slice(), test_numeric.as_slice()],
        numeric_columns.len(),
    )?;
    let mut train_blocks = vec![scaler.transform(&train_numeric)?];
    let mut test_blocks = vec![scaler.transform(&test_numeric)?];
    let mut column_names: Vec<String> = numeric_columns.iter().map(|c| c.name()).collect();

    let documents = |column: TextColumn| {
        let idx = text_configs
            .iter()
            .position(|c| c.column == column)
            .and_then(|pos| text_index[pos]);
        match idx {
            Some(idx) => union_documents(&train, &test, idx),
            None => Vec::new(),
        }
    };
    let vectorizers = fit_vectorizers(text_configs, documents)?;

    for vectorizer in &vectorizers {
        let idx = text_configs
            .iter()
            .position(|c| c.column == vectorizer.column())
            .and_then(|pos| text_index[pos]);
        let (train_docs, test_docs) = match idx {
            Some(idx) => (train.text_column(idx), test.text_column(idx)),
            None => (Vec::new(), Vec::new()),
        };
        train_blocks.push(vectorizer.transform(&train_docs)?);
        test_blocks.push(vectorizer.transform(&test_docs)?);
        column_names.extend(
            vectorizer
                .terms()
                .iter()
                .map(|term| format!("{}:{}", vectorizer.column(), term)),
        );
    }

    let train_matrix = CsrMatrix::hstack(&train_blocks.iter().collect::<Vec<_>>())?;
    let test_matrix = CsrMatrix::hstack(&test_blocks.iter().collect::<Vec<_>>())?;
    info!(
        "Feature matrices: {} columns ({} numeric, {} text), train nnz={}, test nnz={}",
        column_names.len(),
        numeric_columns.len(),
        column_names.len() - numeric_columns.len(),
        train_matrix.nnz(),
        test_matrix.nnz()
    );

    Ok(FeatureMatrices {
        train_ids: train.bidder_ids().into_iter().map(String::from).collect(),
        train_labels: train.labels(),
        train: train_matrix,
        test_ids: test.bidder_ids().into_iter().map(String::from).collect(),
        test: test_matrix,
        column_names,
    })
}

fn union_documents<'a>(train: &'a Partition, test: &'a Partition, idx: usize) -> Vec<&'a str> {
    let mut docs = train.text_column(idx);
    docs.extend(test.text_column(idx));
    docs
}
