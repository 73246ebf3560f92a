//! Unusual proper noun detector
//!
//! A record is unusual when at least one of its proper noun candidates
//! appears in fewer than `threshold` records corpus-wide. Candidates that
//! never made it into the frequency map count as 0, the most unusual case.

use crate::candidates::{CandidateExtractor, ProperNounCandidate};
use crate::detector::{Detection, DetectionInput, DetectionMetadata, Detector};
use crate::frequency::FrequencyMap;
use crate::oracle::TextOracle;
use quizstrata_core::{Record, Stratum};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Per-candidate rarity verdicts for one text
#[derive(Debug, Clone, Default)]
pub struct RarityAssessment {
    /// Every candidate with its corpus count
    pub candidates: Vec<(ProperNounCandidate, u64)>,

    /// Indices into `candidates` whose count is below the threshold
    pub rare: Vec<usize>,
}

impl RarityAssessment {
    /// Share of candidates that are rare (0.0 with no candidates)
    pub fn rare_fraction(&self) -> f32 {
        if self.candidates.is_empty() {
            0.0
        } else {
            self.rare.len() as f32 / self.candidates.len() as f32
        }
    }
}

/// Flags text containing proper nouns that are rare across the corpus
pub struct UnusualProperNounDetector {
    extractor: CandidateExtractor,
    threshold: u64,
    min_rare_fraction: f32,
}

impl UnusualProperNounDetector {
    /// Create a detector that fires on any candidate with count `< threshold`
    pub fn new(oracle: Arc<dyn TextOracle>, threshold: u64) -> Self {
        Self {
            extractor: CandidateExtractor::new(oracle),
            threshold,
            min_rare_fraction: 0.0,
        }
    }

    /// Additionally require this share of candidates to be rare
    pub fn with_min_rare_fraction(mut self, fraction: f32) -> Self {
        self.min_rare_fraction = fraction;
        self
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Check a record's combined question and answer
    pub fn detect(&self, record: &Record, frequencies: &FrequencyMap) -> bool {
        self.detect_text(&record.full_text(), frequencies)
    }

    /// Check arbitrary text
    pub fn detect_text(&self, text: &str, frequencies: &FrequencyMap) -> bool {
        self.is_unusual(&self.assess(text, frequencies))
    }

    /// Look up every candidate. Extraction failure yields no candidates.
    pub fn assess(&self, text: &str, frequencies: &FrequencyMap) -> RarityAssessment {
        let candidates = match self.extractor.extract(text) {
            Ok(candidates) => candidates,
            Err(e) => {
                debug!(
                    oracle = self.extractor.oracle_name(),
                    "Candidate extraction failed, treating as no proper nouns: {}", e
                );
                return RarityAssessment::default();
            }
        };

        let mut assessment = RarityAssessment::default();
        for candidate in candidates {
            let count = frequencies.count(&candidate.normalized);
            if count < self.threshold {
                assessment.rare.push(assessment.candidates.len());
            }
            assessment.candidates.push((candidate, count));
        }
        assessment
    }

    fn is_unusual(&self, assessment: &RarityAssessment) -> bool {
        !assessment.rare.is_empty() && assessment.rare_fraction() >= self.min_rare_fraction
    }
}

impl Detector for UnusualProperNounDetector {
    fn evaluate(&self, input: &DetectionInput<'_>) -> Detection {
        let start = Instant::now();

        let assessment = self.assess(input.text, input.frequencies);
        let detection = if self.is_unusual(&assessment) {
            let mut metadata = DetectionMetadata::default();
            for &index in &assessment.rare {
                let (candidate, count) = &assessment.candidates[index];
                metadata.push("rare_candidate", format!("{} ({})", candidate.normalized, count));
            }
            Detection::positive(metadata)
        } else {
            Detection::negative()
        };

        detection.with_latency(start.elapsed().as_micros() as u64)
    }

    fn name(&self) -> &str {
        "unusual_proper_noun"
    }

    fn stratum(&self) -> Stratum {
        Stratum::UnusualProperNoun
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{EntitySpan, LanguageGuess, TaggedToken};
    use quizstrata_core::{Error, Result};

    /// Tags capitalized words as proper nouns; fails on text containing "#FAIL"
    struct CapitalizedOracle;

    impl TextOracle for CapitalizedOracle {
        fn detect_language(&self, _text: &str) -> Result<LanguageGuess> {
            Ok(LanguageGuess::new("en", 1.0))
        }

        fn extract_entities(&self, text: &str) -> Result<Vec<EntitySpan>> {
            if text.contains("#FAIL") {
                return Err(Error::oracle("model crashed"));
            }
            Ok(Vec::new())
        }

        fn pos_tag(&self, text: &str) -> Result<Vec<TaggedToken>> {
            Ok(text
                .split_whitespace()
                .map(|w| {
                    let tag = if w.starts_with(char::is_uppercase) { "PROPN" } else { "X" };
                    TaggedToken::new(w, tag)
                })
                .collect())
        }

        fn name(&self) -> &str {
            "capitalized"
        }
    }

    fn detector(threshold: u64) -> UnusualProperNounDetector {
        UnusualProperNounDetector::new(Arc::new(CapitalizedOracle), threshold)
    }

    #[test]
    fn test_strictly_below_threshold() {
        let frequencies: FrequencyMap = [("xanadu", 1)].into_iter().collect();
        let record = Record::new(0, "in stately pleasure domes", "Xanadu");

        assert!(detector(5).detect(&record, &frequencies));
        assert!(!detector(1).detect(&record, &frequencies));
    }

    #[test]
    fn test_absent_candidate_counts_as_zero() {
        let frequencies = FrequencyMap::new();
        assert!(detector(1).detect_text("Zorblatt", &frequencies));
    }

    #[test]
    fn test_no_candidates_is_not_unusual() {
        let frequencies = FrequencyMap::new();
        assert!(!detector(5).detect_text("all lower case words", &frequencies));
        assert!(!detector(5).detect_text("", &frequencies));
    }

    #[test]
    fn test_extraction_failure_is_not_unusual() {
        let frequencies = FrequencyMap::new();
        assert!(!detector(5).detect_text("Zorblatt #FAIL", &frequencies));
    }

    #[test]
    fn test_min_rare_fraction() {
        let frequencies: FrequencyMap = [("paris", 10), ("rome", 10), ("zorblatt", 1)]
            .into_iter()
            .collect();
        let text = "Paris Rome Zorblatt";

        assert!(detector(2).detect_text(text, &frequencies));
        assert!(!detector(2)
            .with_min_rare_fraction(0.5)
            .detect_text(text, &frequencies));
        assert!(detector(2)
            .with_min_rare_fraction(0.3)
            .detect_text(text, &frequencies));
    }

    #[test]
    fn test_evaluate_lists_rare_candidates() {
        let frequencies: FrequencyMap = [("paris", 10)].into_iter().collect();
        let detection = detector(2).evaluate(&DetectionInput::new("Paris Zorblatt", &frequencies));

        assert!(detection.fired);
        assert_eq!(
            detection.metadata.values("rare_candidate").collect::<Vec<_>>(),
            vec!["zorblatt (0)"]
        );
    }
}
