//! Record classification
//!
//! Runs every detector against a record's combined question and answer and
//! collects the strata whose detector fired. Detectors are evaluated
//! independently and unconditionally: strata are not exclusive, so one
//! firing never suppresses another.

use crate::config::ClassifierConfig;
use crate::detector::{Detection, DetectionInput, Detector};
use crate::frequency::FrequencyMap;
use crate::language::NonEnglishDetector;
use crate::numbers::NumberDetector;
use crate::oracle::TextOracle;
use crate::proper_nouns::UnusualProperNounDetector;
use quizstrata_core::{Record, Result, StratumSet};
use std::sync::Arc;
use std::time::Instant;

/// Result from one detector within a classification
#[derive(Debug, Clone)]
pub struct DetectorResult {
    /// Detector name
    pub detector_name: String,

    pub stratum: quizstrata_core::Stratum,

    pub detection: Detection,
}

/// Complete classification of one record
#[derive(Debug, Clone)]
pub struct ClassificationOutcome {
    pub strata: StratumSet,

    /// One entry per detector, in evaluation order
    pub results: Vec<DetectorResult>,

    /// Total classification time
    pub total_latency_us: u64,
}

/// Assigns records to strata
pub struct RecordClassifier {
    detectors: Vec<Box<dyn Detector>>,
}

impl RecordClassifier {
    /// The standard three detectors, configured from `config`
    pub fn new(oracle: Arc<dyn TextOracle>, config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self::empty()
            .add_detector(NumberDetector::new()?)
            .add_detector(NonEnglishDetector::new(
                oracle.clone(),
                config.primary_language.clone(),
                config.language_confidence,
            ))
            .add_detector(
                UnusualProperNounDetector::new(oracle, config.frequency_threshold)
                    .with_min_rare_fraction(config.min_rare_fraction),
            ))
    }

    /// A classifier with no detectors
    pub fn empty() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Add a detector
    pub fn add_detector(mut self, detector: impl Detector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    /// Number of detectors
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Strata the record belongs to (often none)
    pub fn classify(&self, record: &Record, frequencies: &FrequencyMap) -> StratumSet {
        self.explain(record, frequencies).strata
    }

    /// Classify and keep every detector's evidence
    pub fn explain(&self, record: &Record, frequencies: &FrequencyMap) -> ClassificationOutcome {
        let start = Instant::now();
        let text = record.full_text();
        let input = DetectionInput::new(&text, frequencies);

        let mut strata = StratumSet::new();
        let mut results = Vec::with_capacity(self.detectors.len());
        for detector in &self.detectors {
            let detection = detector.evaluate(&input);
            if detection.fired {
                strata.insert(detector.stratum());
            }
            results.push(DetectorResult {
                detector_name: detector.name().to_string(),
                stratum: detector.stratum(),
                detection,
            });
        }

        ClassificationOutcome {
            strata,
            results,
            total_latency_us: start.elapsed().as_micros() as u64,
        }
    }
}
