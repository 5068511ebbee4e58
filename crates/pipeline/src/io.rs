//! CSV readers for the bid log, rosters and submission template

use botbid_types::{RawBid, RawRosterRecord};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

use crate::errors::{PipelineError, Result};

fn reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| PipelineError::csv(path, e))
}

/// Deserialize every row of a headed CSV file
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = reader(path)?;
    let records = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|e| PipelineError::csv(path, e))?;
    info!("Loaded {} rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn read_bids(path: &Path) -> Result<Vec<RawBid>> {
    read_records(path)
}

/// Labeled or unlabeled roster; the `outcome` column is optional
pub fn read_roster(path: &Path) -> Result<Vec<RawRosterRecord>> {
    read_records(path)
}

/// Bidder ids of the submission template, in file order
pub fn read_template_ids(path: &Path) -> Result<Vec<String>> {
    let mut reader = reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| PipelineError::csv(path, e))?
        .clone();
    let column = headers
        .iter()
        .position(|h| h.trim() == "bidder_id")
        .ok_or_else(|| PipelineError::MissingColumn {
            path: path.to_path_buf(),
            column: "bidder_id".into(),
        })?;

    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| PipelineError::csv(path, e))?;
        ids.push(record.get(column).unwrap_or_default().trim().to_string());
    }
    info!("Loaded {} template ids from {}", ids.len(), path.display());
    Ok(ids)
}
