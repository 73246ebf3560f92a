//! Text oracle boundary
//!
//! The detectors never talk to an NLP library directly. They depend on the
//! three operations below, so a model server, a spaCy bridge, or the bundled
//! [`HeuristicOracle`](crate::heuristic::HeuristicOracle) can stand behind them.

use quizstrata_core::Result;
use serde::{Deserialize, Serialize};

/// Universal POS tag for proper nouns
pub const PROPN_TAG: &str = "PROPN";

/// Trait for NLP backends answering questions about a piece of text
pub trait TextOracle: Send + Sync {
    /// Identify the dominant language of the text.
    ///
    /// Short or ambiguous text is expected to fail; callers treat an error as
    /// "inconclusive", not as fatal.
    fn detect_language(&self, text: &str) -> Result<LanguageGuess>;

    /// Named entities in document order
    fn extract_entities(&self, text: &str) -> Result<Vec<EntitySpan>>;

    /// Part-of-speech tags for every token, in document order
    fn pos_tag(&self, text: &str) -> Result<Vec<TaggedToken>>;

    /// Get the oracle name
    fn name(&self) -> &str;
}

/// Output of language identification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageGuess {
    /// ISO 639-1 style code ("en", "fr", "pt-BR", ...)
    pub code: String,

    /// Confidence score (0.0-1.0)
    pub confidence: f32,
}

impl LanguageGuess {
    pub fn new(code: impl Into<String>, confidence: f32) -> Self {
        Self {
            code: code.into(),
            confidence,
        }
    }

    /// Compare on the primary subtag only, case-insensitively ("en-US" is "en")
    pub fn is_language(&self, code: &str) -> bool {
        primary_subtag(&self.code).eq_ignore_ascii_case(primary_subtag(code))
    }
}

fn primary_subtag(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code).trim()
}

/// A named entity span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Surface text of the entity
    pub text: String,

    /// Entity label (PERSON, ORG, GPE, MISC, ...)
    pub label: String,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// A token with its part-of-speech tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedToken {
    pub text: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: tag.into(),
        }
    }

    /// True for the universal `PROPN` tag and the Penn `NNP`/`NNPS` tags
    pub fn is_proper_noun(&self) -> bool {
        matches!(self.tag.as_str(), PROPN_TAG | "NNP" | "NNPS")
    }
}
