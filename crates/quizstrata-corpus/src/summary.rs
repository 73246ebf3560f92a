//! End-of-run summary

use quizstrata_core::Stratum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Per-stratum totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StratumSummary {
    /// Records assigned to the stratum before sampling
    pub members: u64,

    /// Records written to the stratum's output file
    pub sampled: u64,

    /// `members` as a percentage of all records
    pub percentage: f64,

    /// Output file, when one was written
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Result of a curation run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurationSummary {
    pub total_records: u64,

    /// Records skipped by the loader because they were not objects
    pub skipped_elements: u64,

    /// Records whose candidate extraction failed during corpus statistics
    pub extraction_failures: u64,

    /// Distinct proper noun candidates in the frequency map
    pub distinct_candidates: u64,

    /// Keyed by stratum label
    pub strata: BTreeMap<Stratum, StratumSummary>,
}

impl CurationSummary {
    /// Record a stratum's totals, computing its share of the corpus
    pub fn set_stratum(&mut self, stratum: Stratum, members: u64, sampled: u64) {
        let percentage = if self.total_records == 0 {
            0.0
        } else {
            members as f64 * 100.0 / self.total_records as f64
        };
        self.strata.insert(
            stratum,
            StratumSummary {
                members,
                sampled,
                percentage,
                output: None,
            },
        );
    }

    /// Attach the output path written for a stratum
    pub fn set_output(&mut self, stratum: Stratum, path: PathBuf) {
        if let Some(entry) = self.strata.get_mut(&stratum) {
            entry.output = Some(path);
        }
    }

    pub fn stratum(&self, stratum: Stratum) -> Option<&StratumSummary> {
        self.strata.get(&stratum)
    }

    /// Log the summary at info level
    pub fn log(&self) {
        info!(
            total_records = self.total_records,
            skipped_elements = self.skipped_elements,
            extraction_failures = self.extraction_failures,
            distinct_candidates = self.distinct_candidates,
            "Curation complete"
        );
        for (stratum, summary) in &self.strata {
            info!(
                stratum = %stratum,
                members = summary.members,
                sampled = summary.sampled,
                "{}: {} records ({:.2}%), {} sampled",
                stratum,
                summary.members,
                summary.percentage,
                summary.sampled
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        let mut summary = CurationSummary {
            total_records: 200,
            ..Default::default()
        };
        summary.set_stratum(Stratum::Numbers, 50, 10);

        let numbers = summary.stratum(Stratum::Numbers).unwrap();
        assert_eq!(numbers.percentage, 25.0);
        assert_eq!(numbers.sampled, 10);
    }

    #[test]
    fn test_empty_corpus_has_zero_percentage() {
        let mut summary = CurationSummary::default();
        summary.set_stratum(Stratum::NonEnglish, 0, 0);
        assert_eq!(summary.stratum(Stratum::NonEnglish).unwrap().percentage, 0.0);
    }

    #[test]
    fn test_serializes_with_stratum_labels() {
        let mut summary = CurationSummary {
            total_records: 4,
            ..Default::default()
        };
        summary.set_stratum(Stratum::UnusualProperNoun, 1, 1);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["strata"]["UNUSUAL_PROPER_NOUN"]["members"], 1);
        assert_eq!(json["strata"]["UNUSUAL_PROPER_NOUN"]["percentage"], 25.0);
    }
}
