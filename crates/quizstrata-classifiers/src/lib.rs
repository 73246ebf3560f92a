//! quizstrata Classifiers
//!
//! Decides which strata a quiz record belongs to.
//!
//! Detectors are organized around a two-pass corpus model:
//! - Pass 1 builds a corpus-wide [`FrequencyMap`] of proper noun candidates
//! - Pass 2 runs every [`Detector`] against each record, reading the map
//!
//! The NLP primitives (language id, entities, POS tags) sit behind the
//! [`TextOracle`] trait; [`HeuristicOracle`] is the bundled implementation.

pub mod candidates;
pub mod config;
pub mod detector;
pub mod frequency;
pub mod heuristic;
pub mod language;
pub mod numbers;
pub mod oracle;
pub mod pipeline;
pub mod proper_nouns;

pub use candidates::{normalize_candidate, CandidateExtractor, CandidateSource, ProperNounCandidate};
pub use config::ClassifierConfig;
pub use detector::{Detection, DetectionInput, DetectionMetadata, Detector};
pub use frequency::{CorpusStatistics, CorpusStatsBuilder, FrequencyMap};
pub use heuristic::HeuristicOracle;
pub use language::{LanguageStrategy, NonEnglishDetector, StrategyOutcome};
pub use numbers::{NumberDetector, NumberKind};
pub use oracle::{EntitySpan, LanguageGuess, TaggedToken, TextOracle, PROPN_TAG};
pub use pipeline::{ClassificationOutcome, DetectorResult, RecordClassifier};
pub use proper_nouns::{RarityAssessment, UnusualProperNounDetector};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::detector::{Detection, Detector};
    pub use crate::frequency::{CorpusStatsBuilder, FrequencyMap};
    pub use crate::heuristic::HeuristicOracle;
    pub use crate::language::NonEnglishDetector;
    pub use crate::numbers::NumberDetector;
    pub use crate::oracle::TextOracle;
    pub use crate::pipeline::RecordClassifier;
    pub use crate::proper_nouns::UnusualProperNounDetector;
}
