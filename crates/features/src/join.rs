//! Roster join and imputation
//!
//! Concatenates the labeled and unlabeled rosters (in that order), left-joins
//! the aggregated bid features on `bidder_id`, then fills gaps: numeric
//! columns with their mean over the concatenated roster, text columns with
//! an empty string. Actors that never bid are expected and simply arrive
//! with every aggregated column missing.

use botbid_types::{Label, NumericColumn, RosterRecord, TextColumn};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::aggregate::AggregatedTable;
use crate::errors::{FeatureError, Result};
use crate::stats::mean_present;

/// One actor after the join, every column filled
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub bidder_id: String,
    pub label: Option<Label>,
    /// Aligned to [`JoinedTable::numeric_columns`]
    pub numeric: Vec<f64>,
    /// Aligned to [`JoinedTable::text_columns`]
    pub text: Vec<String>,
}

/// Row-aligned subset of the joined table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub records: Vec<JoinedRecord>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn bidder_ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.bidder_id.as_str()).collect()
    }

    /// Labels of a training partition; unlabeled rows are skipped
    pub fn labels(&self) -> Vec<Label> {
        self.records.iter().filter_map(|r| r.label).collect()
    }

    pub fn numeric_rows(&self) -> Vec<Vec<f64>> {
        self.records.iter().map(|r| r.numeric.clone()).collect()
    }

    /// Values of the text column at position `idx`
    pub fn text_column(&self, idx: usize) -> Vec<&str> {
        self.records.iter().map(|r| r.text[idx].as_str()).collect()
    }
}

/// The concatenated, joined and imputed actor table
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    pub numeric_columns: Vec<NumericColumn>,
    pub text_columns: Vec<TextColumn>,
    pub records: Vec<JoinedRecord>,
}

impl JoinedTable {
    pub fn text_index(&self, column: TextColumn) -> Option<usize> {
        self.text_columns.iter().position(|&c| c == column)
    }

    /// Split into (labeled, unlabeled) partitions by label presence,
    /// keeping row order within each
    pub fn partition(self) -> (Partition, Partition) {
        let (train, test): (Vec<_>, Vec<_>) =
            self.records.into_iter().partition(|r| r.label.is_some());
        (Partition { records: train }, Partition { records: test })
    }
}

/// Join aggregated features onto the two rosters
pub fn join(
    features: AggregatedTable,
    labeled: Vec<RosterRecord>,
    unlabeled: Vec<RosterRecord>,
) -> Result<JoinedTable> {
    if let Some(record) = labeled.iter().find(|r| !r.labeled()) {
        return Err(FeatureError::MissingLabel(record.bidder_id.clone()));
    }

    let n_labeled = labeled.len();
    let roster: Vec<RosterRecord> = labeled.into_iter().chain(unlabeled).collect();

    let mut seen = HashSet::with_capacity(roster.len());
    for record in &roster {
        if !seen.insert(record.bidder_id.as_str()) {
            return Err(FeatureError::DuplicateActor(record.bidder_id.clone()));
        }
    }

    let numeric_columns = NumericColumn::all();
    let text_columns = TextColumn::all();

    // Left join: `None` marks a value the actor does not have
    let raw_numeric: Vec<Vec<Option<f64>>> = roster
        .iter()
        .map(|record| {
            let actor = features.get(&record.bidder_id);
            numeric_columns
                .iter()
                .map(|&column| actor.and_then(|a| a.numeric(column)))
                .collect()
        })
        .collect();

    let column_means: Vec<f64> = (0..numeric_columns.len())
        .map(|col| {
            mean_present(raw_numeric.iter().map(|row| row[col])).unwrap_or_else(|| {
                warn!(
                    "Column {} has no values in the roster; filling with 0",
                    numeric_columns[col]
                );
                0.0
            })
        })
        .collect();

    let mut never_bid = 0usize;
    let records: Vec<JoinedRecord> = roster
        .into_iter()
        .zip(raw_numeric)
        .map(|(record, numeric)| {
            let actor = features.get(&record.bidder_id);
            if actor.is_none() {
                never_bid += 1;
            }

            let numeric = numeric
                .into_iter()
                .zip(&column_means)
                .map(|(value, &mean)| value.unwrap_or(mean))
                .collect();

            let text = text_columns
                .iter()
                .map(|&column| match column {
                    TextColumn::PaymentAccount => record.payment_account.clone(),
                    TextColumn::Address => record.address.clone(),
                    _ => actor
                        .and_then(|a| a.fingerprint(column))
                        .unwrap_or_default()
                        .to_string(),
                })
                .collect();

            JoinedRecord {
                bidder_id: record.bidder_id,
                label: record.label,
                numeric,
                text,
            }
        })
        .collect();

    info!(
        "Joined {} roster actors ({} labeled, {} unlabeled, {} without bids)",
        records.len(),
        n_labeled,
        records.len() - n_labeled,
        never_bid
    );

    Ok(JoinedTable {
        numeric_columns,
        text_columns,
        records,
    })
}
