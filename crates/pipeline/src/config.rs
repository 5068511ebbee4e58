//! Pipeline configuration
//!
//! Every field defaults to the canonical job, so an empty TOML file (or no
//! file at all) reproduces the standard run.

use botbid_features::DEFAULT_PERCENTILE;
use botbid_trainer::{BaggingConfig, GbdtConfig};
use botbid_types::TextColumnConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::errors::{PipelineError, Result};

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input and output files
    pub paths: PathsConfig,
    /// Text vectorization and column selection
    pub features: FeaturesConfig,
    /// Boosting and bagging hyperparameters
    pub trainer: TrainerConfig,
}

/// File locations. Relative names resolve against `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub bids: PathBuf,
    pub train: PathBuf,
    pub test: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Per-column vectorizer settings, in block order
    pub text_columns: Vec<TextColumnConfig>,
    /// Percentage of columns kept by chi-squared selection
    pub selection_percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TrainerConfig {
    #[serde(flatten)]
    pub gbdt: GbdtConfig,
    #[serde(flatten)]
    pub bagging: BaggingConfig,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            bids: PathBuf::from("bids.csv"),
            train: PathBuf::from("train.csv"),
            test: PathBuf::from("test.csv"),
            template: PathBuf::from("sampleSubmission.csv"),
            output: PathBuf::from("submission.csv"),
        }
    }
}

impl PathsConfig {
    fn resolve(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn bids_path(&self) -> PathBuf {
        self.resolve(&self.bids)
    }

    pub fn train_path(&self) -> PathBuf {
        self.resolve(&self.train)
    }

    pub fn test_path(&self) -> PathBuf {
        self.resolve(&self.test)
    }

    pub fn template_path(&self) -> PathBuf {
        self.resolve(&self.template)
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output)
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            text_columns: TextColumnConfig::defaults(),
            selection_percentile: DEFAULT_PERCENTILE,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let content =
            std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config: PipelineConfig = toml::from_str(&content).map_err(|e| {
            PipelineError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Rebase every input and output file onto `dir`
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.data_dir = dir.into();
        self
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> Result<()> {
        self.trainer
            .gbdt
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        if self.trainer.bagging.bag_size == 0 {
            return Err(PipelineError::Config("bag_size must be positive".into()));
        }

        let pct = self.features.selection_percentile;
        if !(pct > 0.0 && pct <= 100.0) {
            return Err(PipelineError::Config(format!(
                "selection_percentile must be in (0, 100], got {}",
                pct
            )));
        }

        let mut seen = BTreeSet::new();
        for column in &self.features.text_columns {
            if !seen.insert(column.column) {
                return Err(PipelineError::Config(format!(
                    "text column {} configured twice",
                    column.column
                )));
            }
            if !column.included {
                continue;
            }
            let (min, max) = column.ngram_range;
            if min == 0 || min > max {
                return Err(PipelineError::Config(format!(
                    "text column {}: empty ngram range ({}, {})",
                    column.column, min, max
                )));
            }
            if column.min_frequency == 0 {
                return Err(PipelineError::Config(format!(
                    "text column {}: min_frequency must be positive",
                    column.column
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use botbid_types::{TextColumn, TokenizerMode};
    use std::io::Write;

    #[test]
    fn test_default_is_canonical_job() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trainer.gbdt.num_trees, 100);
        assert_eq!(config.trainer.bagging.bag_size, 15);
        assert_eq!(config.features.selection_percentile, 25.0);
        assert_eq!(config.features.text_columns.len(), 9);
        assert_eq!(config.paths.output_path(), Path::new("./submission.csv"));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let toml = r#"
            [paths]
            data_dir = "data"

            [trainer]
            num_trees = 10
            threads = 2

            [[features.text_columns]]
            column = "time_diff"
            included = true
            min_frequency = 1
            ngram_range = [1, 2]
            tokenizer = "whitespace"
        "#;
        let config: PipelineConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.trainer.gbdt.num_trees, 10);
        assert_eq!(config.trainer.gbdt.max_depth, 3);
        assert_eq!(config.trainer.bagging.threads, 2);
        assert_eq!(config.trainer.bagging.bag_size, 15);
        assert_eq!(config.paths.bids_path(), Path::new("data/bids.csv"));
        assert_eq!(
            config.features.text_columns,
            vec![TextColumnConfig::new(
                TextColumn::TimeDiff,
                1,
                (1, 2),
                TokenizerMode::Whitespace
            )]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[features]\nselection_percentile = 50.0").unwrap();

        let config = PipelineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.features.selection_percentile, 50.0);

        assert!(PipelineConfig::load_from_file("/nonexistent/botbid.toml").is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = PipelineConfig::default();
        config.trainer.gbdt.subsample = 1.5;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.trainer.bagging.bag_size = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.features.selection_percentile = 0.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.features.text_columns[2].ngram_range = (2, 1);
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        let duplicate = config.features.text_columns[3].clone();
        config.features.text_columns.push(duplicate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_data_dir_rebases_paths() {
        let config = PipelineConfig::default().with_data_dir("/tmp/run");
        assert_eq!(config.paths.template_path(), Path::new("/tmp/run/sampleSubmission.csv"));
    }
}
