//! botbid pipeline: bid logs in, robot probabilities out
//!
//! Wires the feature and trainer crates into one deterministic batch job
//! and handles its file formats and configuration.

pub mod config;
pub mod errors;
pub mod io;
pub mod pipeline;
pub mod submission;

pub use config::{FeaturesConfig, PathsConfig, PipelineConfig, TrainerConfig};
pub use errors::PipelineError;
pub use pipeline::{run, RunReport};
pub use submission::{ensure_order, write_submission};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
