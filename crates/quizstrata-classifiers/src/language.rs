//! Non-primary-language detector
//!
//! Language identifiers are unreliable on the short phrases typical of quiz
//! clues, so detection runs an ordered chain of strategies. Each strategy
//! either fires or passes with a reason; the first one to fire decides.
//! The default chain is language identification followed by a non-ASCII
//! character scan.

use crate::detector::{Detection, DetectionInput, DetectionMetadata, Detector};
use crate::oracle::TextOracle;
use quizstrata_core::Stratum;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Outcome of one strategy in the chain
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// The text is not (only) in the primary language
    Fired { evidence: String },

    /// No decision; the next strategy runs
    Passed { reason: String },
}

/// One link in the fallback chain
pub trait LanguageStrategy: Send + Sync {
    fn check(&self, text: &str) -> StrategyOutcome;

    fn name(&self) -> &str;
}

/// Asks the text oracle for the dominant language
pub struct LanguageIdStrategy {
    oracle: Arc<dyn TextOracle>,
    primary_language: String,
    min_confidence: f32,
}

impl LanguageIdStrategy {
    pub fn new(
        oracle: Arc<dyn TextOracle>,
        primary_language: impl Into<String>,
        min_confidence: f32,
    ) -> Self {
        Self {
            oracle,
            primary_language: primary_language.into(),
            min_confidence,
        }
    }
}

impl LanguageStrategy for LanguageIdStrategy {
    fn check(&self, text: &str) -> StrategyOutcome {
        match self.oracle.detect_language(text) {
            Ok(guess) if guess.is_language(&self.primary_language) => StrategyOutcome::Passed {
                reason: format!("identified as primary language {}", guess.code),
            },
            Ok(guess) if guess.confidence > self.min_confidence => StrategyOutcome::Fired {
                evidence: format!("{} ({:.2})", guess.code, guess.confidence),
            },
            Ok(guess) => StrategyOutcome::Passed {
                reason: format!(
                    "low confidence for {} ({:.2} <= {:.2})",
                    guess.code, guess.confidence, self.min_confidence
                ),
            },
            Err(e) => {
                debug!(oracle = self.oracle.name(), "Language identification failed: {}", e);
                StrategyOutcome::Passed {
                    reason: format!("identification failed: {}", e),
                }
            }
        }
    }

    fn name(&self) -> &str {
        "language_id"
    }
}

/// Fires on any character outside printable ASCII
pub struct NonAsciiStrategy;

impl NonAsciiStrategy {
    /// Printable ASCII plus the ASCII whitespace a record can legitimately carry
    fn is_plain_ascii(c: char) -> bool {
        matches!(c, ' '..='~' | '\t' | '\n' | '\r')
    }
}

impl LanguageStrategy for NonAsciiStrategy {
    fn check(&self, text: &str) -> StrategyOutcome {
        match text.char_indices().find(|(_, c)| !Self::is_plain_ascii(*c)) {
            Some((offset, c)) => StrategyOutcome::Fired {
                evidence: format!("U+{:04X} at byte {}", c as u32, offset),
            },
            None => StrategyOutcome::Passed {
                reason: "plain ASCII".to_string(),
            },
        }
    }

    fn name(&self) -> &str {
        "non_ascii"
    }
}

/// Detects text that is not in the configured primary language
pub struct NonEnglishDetector {
    strategies: Vec<Box<dyn LanguageStrategy>>,
}

impl NonEnglishDetector {
    /// Language identification, then the non-ASCII fallback
    pub fn new(
        oracle: Arc<dyn TextOracle>,
        primary_language: impl Into<String>,
        min_confidence: f32,
    ) -> Self {
        Self::with_strategies(vec![
            Box::new(LanguageIdStrategy::new(oracle, primary_language, min_confidence)),
            Box::new(NonAsciiStrategy),
        ])
    }

    /// Build a detector from an explicit chain, tried in order
    pub fn with_strategies(strategies: Vec<Box<dyn LanguageStrategy>>) -> Self {
        Self { strategies }
    }

    /// True when some strategy in the chain fires
    pub fn detect(&self, text: &str) -> bool {
        self.run(text).0.is_some()
    }

    /// Walk the chain. Returns the firing strategy (if any) and the trail of outcomes.
    fn run(&self, text: &str) -> (Option<usize>, Vec<(&str, StrategyOutcome)>) {
        let mut trail = Vec::with_capacity(self.strategies.len());
        if text.trim().is_empty() {
            return (None, trail);
        }

        for (index, strategy) in self.strategies.iter().enumerate() {
            let outcome = strategy.check(text);
            let fired = matches!(outcome, StrategyOutcome::Fired { .. });
            trail.push((strategy.name(), outcome));
            if fired {
                return (Some(index), trail);
            }
        }

        (None, trail)
    }
}

impl Detector for NonEnglishDetector {
    fn evaluate(&self, input: &DetectionInput<'_>) -> Detection {
        let start = Instant::now();

        let (fired_at, trail) = self.run(input.text);

        let mut metadata = DetectionMetadata::default();
        for (name, outcome) in trail {
            match outcome {
                StrategyOutcome::Fired { evidence } => metadata.push(name, evidence),
                StrategyOutcome::Passed { reason } => metadata.push(name, reason),
            }
        }

        let detection = match fired_at {
            Some(_) => Detection::positive(metadata),
            None => Detection {
                metadata,
                ..Detection::negative()
            },
        };

        detection.with_latency(start.elapsed().as_micros() as u64)
    }

    fn name(&self) -> &str {
        "non_english"
    }

    fn stratum(&self) -> Stratum {
        Stratum::NonEnglish
    }
}
