//! End-to-end batch run
//!
//! Stages run once, in order: load, normalize, aggregate, join, vectorize,
//! select, train, predict, write. Any failure aborts the run before the
//! submission file is touched.

use botbid_features::{
    aggregate, build_feature_matrices, join, normalize_bids, normalize_roster, Chi2Selector,
};
use botbid_trainer::{roc_auc, BaggedClassifier};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::errors::Result;
use crate::io::{read_bids, read_roster, read_template_ids};
use crate::submission::{ensure_order, write_submission};

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub bid_count: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Columns before selection
    pub feature_columns: usize,
    /// Columns the classifier was trained on
    pub selected_columns: usize,
    /// Model hash per bag member, in seed order
    pub member_hashes: Vec<String>,
    /// In-sample ROC AUC of the averaged training predictions
    pub train_auc: Option<f64>,
    pub output: PathBuf,
    /// BLAKE3 hex digest of the submission file
    pub digest: String,
}

/// Execute the whole job described by `config`
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    config.validate()?;
    let paths = &config.paths;

    let bids = normalize_bids(read_bids(&paths.bids_path())?)?;
    let labeled = normalize_roster(read_roster(&paths.train_path())?)?;
    let unlabeled = normalize_roster(read_roster(&paths.test_path())?)?;
    let template = read_template_ids(&paths.template_path())?;

    let aggregated = aggregate(&bids);

    let table = join(aggregated, labeled, unlabeled)?;
    let matrices = build_feature_matrices(table, &config.features.text_columns)?;
    ensure_order(&template, &matrices.test_ids)?;

    let selector = Chi2Selector::fit(
        &matrices.train,
        &matrices.train_labels,
        config.features.selection_percentile,
    )?;
    let train = selector.transform(&matrices.train)?;
    let test = selector.transform(&matrices.test)?;
    for &column in selector.selected().iter().take(10) {
        debug!(
            "kept column {} (chi2 {})",
            matrices.column_names[column],
            selector.scores()[column]
        );
    }
    info!(
        "Selected {} of {} feature columns",
        train.n_cols(),
        matrices.n_cols()
    );

    let targets: Vec<f64> = matrices.train_labels.iter().map(|l| l.target()).collect();
    let bag = BaggedClassifier::fit(
        &train,
        &targets,
        &config.trainer.gbdt,
        &config.trainer.bagging,
    )?;

    let train_auc = roc_auc(&targets, &bag.predict_proba(&train)?);
    match train_auc {
        Some(auc) => info!("In-sample ROC AUC: {:.6}", auc),
        None => warn!("In-sample ROC AUC undefined: training labels hold a single class"),
    }

    let predictions = bag.predict_proba(&test)?;
    let output = paths.output_path();
    let digest = write_submission(&output, &matrices.test_ids, &predictions)?;

    Ok(RunReport {
        bid_count: bids.len(),
        train_rows: train.n_rows(),
        test_rows: test.n_rows(),
        feature_columns: matrices.n_cols(),
        selected_columns: train.n_cols(),
        member_hashes: bag.member_hashes().to_vec(),
        train_auc,
        output,
        digest,
    })
}
