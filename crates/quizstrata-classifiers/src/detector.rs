//! Detector trait and common types

use crate::frequency::FrequencyMap;
use quizstrata_core::Stratum;

/// Trait for all stratum detectors
///
/// Detectors are pure with respect to their input: the same text and
/// frequency map always produce the same verdict.
pub trait Detector: Send + Sync {
    /// Evaluate the given input
    fn evaluate(&self, input: &DetectionInput<'_>) -> Detection;

    /// Get the detector name
    fn name(&self) -> &str;

    /// The stratum this detector assigns records to
    fn stratum(&self) -> Stratum;
}

/// What a detector gets to look at for one record
#[derive(Debug, Clone, Copy)]
pub struct DetectionInput<'a> {
    /// Question and answer joined into one text
    pub text: &'a str,

    /// Corpus-wide candidate frequencies from the statistics pass
    pub frequencies: &'a FrequencyMap,
}

impl<'a> DetectionInput<'a> {
    pub fn new(text: &'a str, frequencies: &'a FrequencyMap) -> Self {
        Self { text, frequencies }
    }
}

/// Result of a single detector run
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Whether the detector fired
    pub fired: bool,

    /// Supporting evidence
    pub metadata: DetectionMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl Detection {
    /// A detection that did not fire
    pub fn negative() -> Self {
        Self::default()
    }

    /// A detection that fired with the given evidence
    pub fn positive(metadata: DetectionMetadata) -> Self {
        Self {
            fired: true,
            metadata,
            latency_us: 0,
        }
    }

    /// Attach a measured latency
    pub fn with_latency(mut self, latency_us: u64) -> Self {
        self.latency_us = latency_us;
        self
    }
}

/// Evidence behind a detection
#[derive(Debug, Clone, Default)]
pub struct DetectionMetadata {
    /// Matched byte spans (for pattern-based detectors)
    pub spans: Vec<(usize, usize)>,

    /// Additional key-value pairs
    pub evidence: Vec<(String, String)>,
}

impl DetectionMetadata {
    /// Add a key-value pair
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.evidence.push((key.into(), value.into()));
    }

    /// Values recorded under `key`
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.evidence
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
