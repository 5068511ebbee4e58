use botbid_types::{MatrixError, TextColumn};
use thiserror::Error;

/// Errors raised while turning bid logs into feature matrices
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("bid row {row}: invalid timestamp {value:?}")]
    InvalidTimestamp { row: usize, value: String },

    #[error("bid row {row}: empty bidder_id")]
    MissingBidder { row: usize },

    #[error("roster row {row}: invalid outcome {value}")]
    InvalidOutcome { row: usize, value: f64 },

    #[error("labeled roster row for {0} has no outcome")]
    MissingLabel(String),

    #[error("duplicate bidder_id {0} in roster")]
    DuplicateActor(String),

    #[error("empty vocabulary for column {0} after frequency filtering")]
    EmptyVocabulary(TextColumn),

    #[error("invalid ngram range ({0}, {1})")]
    InvalidNgramRange(usize, usize),

    #[error("chi-squared selection requires non-negative features, found {0}")]
    NegativeFeature(f64),

    #[error("label count {labels} does not match {rows} training rows")]
    LabelMismatch { labels: usize, rows: usize },

    #[error("scaler fitted on {expected} columns, got a row with {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

pub type Result<T> = std::result::Result<T, FeatureError>;
