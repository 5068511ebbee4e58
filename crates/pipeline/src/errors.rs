use botbid_features::FeatureError;
use botbid_trainer::TrainerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no {column} column")]
    MissingColumn { path: PathBuf, column: String },

    #[error("failed to encode submission: {0}")]
    Encode(#[from] csv::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("submission template lists {template} actors, test roster has {test}")]
    TemplateLength { template: usize, test: usize },

    #[error("{ids} submission ids but {predictions} predictions")]
    PredictionCount { ids: usize, predictions: usize },

    #[error("submission template row {position} is {template}, test roster has {test}")]
    TemplateOrder {
        position: usize,
        template: String,
        test: String,
    },

    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error(transparent)]
    Trainer(#[from] TrainerError),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
