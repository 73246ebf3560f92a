//! Corpus-wide proper noun frequencies
//!
//! The map counts, for every normalized candidate, how many records contain
//! it. It is built in one full pass before any record is classified and is
//! read-only afterwards. Counts only grow.

use crate::candidates::{normalize_candidate, CandidateExtractor};
use crate::oracle::TextOracle;
use quizstrata_core::Record;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

/// Normalized candidate text → number of records containing it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyMap {
    counts: HashMap<String, u64>,
}

impl FrequencyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for an already-normalized key (absent = 0)
    pub fn count(&self, normalized: &str) -> u64 {
        self.counts.get(normalized).copied().unwrap_or(0)
    }

    /// Count for raw surface text, normalized first
    pub fn count_of(&self, text: &str) -> u64 {
        self.count(&normalize_candidate(text))
    }

    /// Record one document's distinct keys. Callers pass each key at most once.
    pub fn add_document<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for key in keys {
            *self.counts.entry(key.into()).or_insert(0) += 1;
        }
    }

    /// Sum another map into this one
    pub fn merge(&mut self, other: FrequencyMap) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
    }

    /// Number of distinct candidates
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries by count descending, then text ascending
    pub fn sorted_entries(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// Persist as a JSON object in `sorted_entries` order
    pub fn write_json<W: Write>(&self, writer: W) -> quizstrata_core::Result<()> {
        serde_json::to_writer_pretty(writer, &SortedEntries(self.sorted_entries()))?;
        Ok(())
    }
}

struct SortedEntries<'a>(Vec<(&'a str, u64)>);

impl Serialize for SortedEntries<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (*k, *v)))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for FrequencyMap {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, count) in iter {
            *map.counts.entry(normalize_candidate(&key.into())).or_insert(0) += count;
        }
        map
    }
}

/// Output of the statistics pass
#[derive(Debug, Clone, Default)]
pub struct CorpusStatistics {
    pub frequencies: FrequencyMap,

    /// Records fed to the builder
    pub records_observed: u64,

    /// Records whose candidate extraction failed and contributed nothing
    pub extraction_failures: u64,
}

/// Accumulates the frequency map one record at a time
pub struct CorpusStatsBuilder {
    extractor: CandidateExtractor,
    stats: CorpusStatistics,
}

impl CorpusStatsBuilder {
    pub fn new(oracle: Arc<dyn TextOracle>) -> Self {
        Self {
            extractor: CandidateExtractor::new(oracle),
            stats: CorpusStatistics::default(),
        }
    }

    /// Add one record's candidates. Extraction failures are logged and skipped.
    pub fn observe(&mut self, record: &Record) {
        self.stats.records_observed += 1;

        match self.extractor.extract_keys(&record.full_text()) {
            Ok(keys) => self.stats.frequencies.add_document(keys),
            Err(e) => {
                self.stats.extraction_failures += 1;
                debug!(record_id = record.id, "Skipping record in corpus statistics: {}", e);
            }
        }
    }

    /// Records observed so far
    pub fn records_observed(&self) -> u64 {
        self.stats.records_observed
    }

    /// Finish the pass
    pub fn finish(self) -> CorpusStatistics {
        info!(
            "Corpus statistics built: {} records, {} distinct candidates, {} extraction failures",
            self.stats.records_observed,
            self.stats.frequencies.len(),
            self.stats.extraction_failures
        );
        self.stats
    }

    /// Build a frequency map from a complete record stream
    pub fn build<'r, I>(oracle: Arc<dyn TextOracle>, records: I) -> FrequencyMap
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let mut builder = Self::new(oracle);
        for record in records {
            builder.observe(record);
        }
        builder.finish().frequencies
    }
}
