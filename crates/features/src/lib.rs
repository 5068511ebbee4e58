//! botbid feature engineering
//!
//! Turns a normalized bid log and two actor rosters into row-aligned sparse
//! train/test matrices:
//! - `normalize`: whitespace trimming and timestamp parsing
//! - `aggregate`: chronological per-actor fingerprints and gap statistics
//! - `join`: roster concatenation, left join and mean/empty imputation
//! - `scale`: joint min-max scaling
//! - `tfidf`: per-column n-gram TF-IDF vectorizers
//! - `select`: chi-squared top-percentile column filter
//! - `assemble`: stitches the numeric and text blocks together

pub mod aggregate;
pub mod assemble;
pub mod errors;
pub mod join;
pub mod normalize;
pub mod scale;
pub mod select;
pub mod stats;
pub mod tfidf;

pub use aggregate::{aggregate, ActorFeatures, AggregatedTable};
pub use assemble::{build_feature_matrices, FeatureMatrices};
pub use errors::FeatureError;
pub use join::{join, JoinedRecord, JoinedTable, Partition};
pub use normalize::{normalize_bid, normalize_bids, normalize_roster};
pub use scale::MinMaxScaler;
pub use select::{chi2_scores, Chi2Selector, DEFAULT_PERCENTILE};
pub use tfidf::{TfIdfVectorizer, tokenize};
