use thiserror::Error;

/// Errors returned when evaluating or fingerprinting a model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature size mismatch: model expects {expected}, got {actual}")]
    FeatureSizeMismatch { expected: usize, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
