//! Curation run configuration

use crate::sampling::SamplingMode;
use quizstrata_classifiers::ClassifierConfig;
use quizstrata_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything a curation run needs besides the corpus path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurationConfig {
    /// Detector thresholds
    #[serde(flatten)]
    pub classifier: ClassifierConfig,

    /// Maximum records written per stratum
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Seed for every sampling RNG
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Directory receiving the stratum files and summary
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Spread samples across categories proportionally
    #[serde(default)]
    pub stratify: bool,

    /// Log progress every this many records (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,

    /// Also write the frequency map to `frequencies.json`
    #[serde(default)]
    pub dump_frequencies: bool,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            sample_size: default_sample_size(),
            seed: default_seed(),
            output_dir: default_output_dir(),
            stratify: false,
            progress_interval: default_progress_interval(),
            dump_frequencies: false,
        }
    }
}

impl CurationConfig {
    /// Load from a YAML file, or defaults when the file does not exist.
    ///
    /// Not validated: apply overrides first, then call [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            debug!(path = %path.display(), "Loading configuration");
            let content = std::fs::read_to_string(path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would invalidate the run
    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()?;
        if self.sample_size == 0 {
            return Err(Error::config("sample_size must be a positive integer"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::config("output_dir must not be empty"));
        }
        Ok(())
    }

    pub fn sampling_mode(&self) -> SamplingMode {
        if self.stratify {
            SamplingMode::Stratified
        } else {
            SamplingMode::Uniform
        }
    }
}

fn default_sample_size() -> usize {
    1000
}

fn default_seed() -> u64 {
    42
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}

fn default_progress_interval() -> u64 {
    10_000
}
