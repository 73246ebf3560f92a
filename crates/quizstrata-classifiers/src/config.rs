//! Configuration for the stratum detectors

use quizstrata_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Detector thresholds, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Language the corpus is expected to be in
    #[serde(default = "default_primary_language")]
    pub primary_language: String,

    /// A candidate seen in fewer records than this is unusual
    #[serde(default = "default_frequency_threshold")]
    pub frequency_threshold: u64,

    /// Language id must be strictly more confident than this to count
    #[serde(default = "default_language_confidence")]
    pub language_confidence: f32,

    /// Share of a record's candidates that must be rare (0.0 = any one)
    #[serde(default)]
    pub min_rare_fraction: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            primary_language: default_primary_language(),
            frequency_threshold: default_frequency_threshold(),
            language_confidence: default_language_confidence(),
            min_rare_fraction: 0.0,
        }
    }
}

impl ClassifierConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would invalidate the whole run
    pub fn validate(&self) -> Result<()> {
        if self.primary_language.trim().is_empty() {
            return Err(Error::config("primary_language must not be empty"));
        }
        if self.frequency_threshold == 0 {
            return Err(Error::config(
                "frequency_threshold must be a positive integer",
            ));
        }
        if !(0.0..=1.0).contains(&self.language_confidence) {
            return Err(Error::config(format!(
                "language_confidence must be within [0, 1], got {}",
                self.language_confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.min_rare_fraction) {
            return Err(Error::config(format!(
                "min_rare_fraction must be within [0, 1], got {}",
                self.min_rare_fraction
            )));
        }
        Ok(())
    }
}

fn default_primary_language() -> String {
    "en".to_string()
}

fn default_frequency_threshold() -> u64 {
    3
}

fn default_language_confidence() -> f32 {
    0.75
}
