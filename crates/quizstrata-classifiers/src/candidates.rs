//! Proper noun candidate extraction
//!
//! Both the statistics pass and the unusual proper noun detector must see
//! the exact same candidates for a text, so extraction lives here and
//! nowhere else.
//!
//! Candidates are the union of entity spans and proper-noun tagged tokens,
//! deduplicated by normalized text. Span boundaries are not reconciled: an
//! entity "New York" and a token "York" are two different candidates.

use crate::oracle::TextOracle;
use quizstrata_core::Result;
use std::collections::HashSet;
use std::sync::Arc;

/// Where a candidate came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Named entity with its label
    Entity(String),
    /// Token with its POS tag
    PosTag(String),
}

/// A proper noun found in one record's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProperNounCandidate {
    /// Surface text as the oracle returned it
    pub text: String,

    /// Key used in the frequency map
    pub normalized: String,

    pub source: CandidateSource,
}

/// Case-fold, trim, and collapse inner whitespace
pub fn normalize_candidate(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extracts deduplicated proper noun candidates through a text oracle
#[derive(Clone)]
pub struct CandidateExtractor {
    oracle: Arc<dyn TextOracle>,
}

impl CandidateExtractor {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self { oracle }
    }

    /// Name of the oracle behind this extractor
    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Candidates in document order: entities first, then tagged tokens.
    ///
    /// When an entity and a token normalize to the same text, the entity wins.
    pub fn extract(&self, text: &str) -> Result<Vec<ProperNounCandidate>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entities = self.oracle.extract_entities(text)?;
        let tokens = self.oracle.pos_tag(text)?;

        let entity_candidates = entities
            .into_iter()
            .map(|e| (e.text, CandidateSource::Entity(e.label)));
        let token_candidates = tokens
            .into_iter()
            .filter(|t| t.is_proper_noun())
            .map(|t| (t.text, CandidateSource::PosTag(t.tag)));

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for (surface, source) in entity_candidates.chain(token_candidates) {
            let normalized = normalize_candidate(&surface);
            if normalized.is_empty() || !seen.insert(normalized.clone()) {
                continue;
            }
            candidates.push(ProperNounCandidate {
                text: surface,
                normalized,
                source,
            });
        }

        Ok(candidates)
    }

    /// Distinct normalized keys for a text
    pub fn extract_keys(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .extract(text)?
            .into_iter()
            .map(|c| c.normalized)
            .collect())
    }
}
