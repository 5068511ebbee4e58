//! botbid trainer: deterministic histogram GBDT with seed bagging
//!
//! Trains gradient boosted trees with logistic loss on sparse feature
//! matrices. A given seed always produces the same model, whatever the
//! number of worker threads.

pub mod bagging;
pub mod cart;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod metrics;
pub mod trainer;

pub use bagging::{BaggedClassifier, BaggingConfig};
pub use cart::{CartBuilder, TreeConfig};
pub use dataset::Dataset;
pub use deterministic::{seeded_rng, SplitTieBreaker};
pub use errors::TrainerError;
pub use metrics::roc_auc;
pub use trainer::{GbdtConfig, GbdtTrainer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
