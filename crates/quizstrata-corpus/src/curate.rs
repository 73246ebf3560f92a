//! Two-pass curation driver
//!
//! Pass 1 streams the whole corpus to build the proper noun frequency map.
//! Pass 2 streams it again, classifying every record against the finished
//! map and filling one bucket per stratum. Buckets are then sampled and
//! written. Any error in pass 1 aborts the run before pass 2 starts, and
//! nothing is written until both passes have succeeded.

use crate::config::CurationConfig;
use crate::loader::{CorpusLoader, LoadStats};
use crate::sampling::{Sampler, StratumBucket};
use crate::summary::CurationSummary;
use crate::writer::SampleWriter;
use quizstrata_classifiers::{
    CorpusStatistics, CorpusStatsBuilder, FrequencyMap, HeuristicOracle, RecordClassifier,
    TextOracle,
};
use quizstrata_core::{Result, Stratum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// File name of the run summary in the output directory
pub const SUMMARY_FILE: &str = "summary.json";

/// File name of the optional frequency dump
pub const FREQUENCIES_FILE: &str = "frequencies.json";

/// Stratum membership produced by pass 2
#[derive(Debug, Clone)]
pub struct StratumAssignment {
    /// One bucket per stratum, in `Stratum::ALL` order
    pub buckets: Vec<StratumBucket>,

    pub load: LoadStats,
}

impl StratumAssignment {
    pub fn bucket(&self, stratum: Stratum) -> Option<&StratumBucket> {
        self.buckets.iter().find(|b| b.stratum() == stratum)
    }
}

/// Runs the full curation pipeline for one configuration
pub struct Curator {
    config: CurationConfig,
    oracle: Arc<dyn TextOracle>,
}

impl Curator {
    /// Validates the configuration before anything is read
    pub fn new(config: CurationConfig, oracle: Arc<dyn TextOracle>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, oracle })
    }

    /// Curator backed by the bundled heuristic oracle
    pub fn with_heuristic_oracle(config: CurationConfig) -> Result<Self> {
        let oracle = Arc::new(HeuristicOracle::new()?);
        Self::new(config, oracle)
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    /// Run both passes over `source`, then sample and write every stratum
    pub fn run(&self, source: impl AsRef<Path>) -> Result<CurationSummary> {
        let started = Instant::now();
        let loader = CorpusLoader::open(source)?;
        info!(
            source = %loader.path().display(),
            oracle = self.oracle.name(),
            "Starting curation"
        );

        let stats = self.corpus_statistics(&loader)?;
        let assignment = self.assign_strata(&loader, &stats.frequencies)?;

        let summary = self.write_outputs(&stats, &assignment)?;
        summary.log();
        info!(elapsed_ms = started.elapsed().as_millis() as u64, "Curation finished");
        Ok(summary)
    }

    /// Pass 1: corpus-wide proper noun frequencies
    pub fn corpus_statistics(&self, loader: &CorpusLoader) -> Result<CorpusStatistics> {
        info!("Pass 1: building corpus statistics");
        let mut builder = CorpusStatsBuilder::new(self.oracle.clone());

        loader.for_each(|record| {
            builder.observe(&record);
            metrics::counter!("quizstrata_records_observed_total").increment(1);
            self.log_progress("statistics", builder.records_observed());
            Ok(())
        })?;

        let stats = builder.finish();
        if stats.extraction_failures > 0 {
            metrics::counter!("quizstrata_extraction_failures_total")
                .increment(stats.extraction_failures);
        }
        Ok(stats)
    }

    /// Pass 2: classify every record against the finished map
    pub fn assign_strata(
        &self,
        loader: &CorpusLoader,
        frequencies: &FrequencyMap,
    ) -> Result<StratumAssignment> {
        info!("Pass 2: assigning strata");
        let classifier = RecordClassifier::new(self.oracle.clone(), &self.config.classifier)?;
        let mut buckets: Vec<StratumBucket> =
            Stratum::ALL.into_iter().map(StratumBucket::new).collect();
        let mut classified = 0u64;

        let load = loader.for_each(|record| {
            let outcome = classifier.explain(&record, frequencies);
            metrics::histogram!("quizstrata_classification_latency_us")
                .record(outcome.total_latency_us as f64);

            for bucket in buckets.iter_mut() {
                if outcome.strata.contains(bucket.stratum()) {
                    metrics::counter!(
                        "quizstrata_stratum_members_total",
                        "stratum" => bucket.stratum().as_str()
                    )
                    .increment(1);
                    bucket.push(record.clone());
                }
            }

            classified += 1;
            self.log_progress("classification", classified);
            Ok(())
        })?;

        if load.skipped > 0 {
            warn!(skipped = load.skipped, "Corpus contained non-object elements");
        }
        Ok(StratumAssignment { buckets, load })
    }

    fn write_outputs(
        &self,
        stats: &CorpusStatistics,
        assignment: &StratumAssignment,
    ) -> Result<CurationSummary> {
        let writer = SampleWriter::create(&self.config.output_dir)?;
        let sampler = Sampler::new(self.config.sample_size, self.config.seed)
            .with_mode(self.config.sampling_mode());

        let mut summary = CurationSummary {
            total_records: assignment.load.records,
            skipped_elements: assignment.load.skipped,
            extraction_failures: stats.extraction_failures,
            distinct_candidates: stats.frequencies.len() as u64,
            ..Default::default()
        };

        for bucket in &assignment.buckets {
            let sample = sampler.sample(bucket);
            let path = writer.write_stratum(bucket.stratum(), sample.iter().copied())?;
            summary.set_stratum(bucket.stratum(), bucket.len() as u64, sample.len() as u64);
            summary.set_output(bucket.stratum(), path);
        }

        if self.config.dump_frequencies {
            let path = writer.output_dir().join(FREQUENCIES_FILE);
            let mut out = BufWriter::new(File::create(&path)?);
            stats.frequencies.write_json(&mut out)?;
            out.flush()?;
            info!(path = %path.display(), "Wrote frequency map");
        }

        writer.write_json(SUMMARY_FILE, &summary)?;
        Ok(summary)
    }

    fn log_progress(&self, phase: &str, processed: u64) {
        let interval = self.config.progress_interval;
        if interval > 0 && processed % interval == 0 {
            info!(phase, processed, "Progress");
        }
    }
}

/// Register descriptions for the metrics emitted during curation
pub fn describe_metrics() {
    metrics::describe_counter!(
        "quizstrata_records_observed_total",
        "Records read during the corpus statistics pass"
    );
    metrics::describe_counter!(
        "quizstrata_extraction_failures_total",
        "Records whose proper noun extraction failed"
    );
    metrics::describe_counter!(
        "quizstrata_stratum_members_total",
        "Records assigned to each stratum"
    );
    metrics::describe_histogram!(
        "quizstrata_classification_latency_us",
        "Per-record classification latency in microseconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    fn corpus(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    fn curator(output: &TempDir) -> Curator {
        let config = CurationConfig {
            output_dir: output.path().to_path_buf(),
            ..Default::default()
        };
        Curator::with_heuristic_oracle(config).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_before_reading() {
        let config = CurationConfig {
            sample_size: 0,
            ..Default::default()
        };
        assert!(Curator::with_heuristic_oracle(config).is_err());
    }

    #[test]
    fn test_passes_share_record_ids() {
        let file = corpus(&[
            r#"{"question": "12 apostles", "answer": "Bible"}"#,
            r#"[1, 2]"#,
            r#"{"question": "Café society", "answer": "Paris"}"#,
        ]);
        let output = TempDir::new().unwrap();
        let curator = curator(&output);
        let loader = CorpusLoader::open(file.path()).unwrap();

        let stats = curator.corpus_statistics(&loader).unwrap();
        let assignment = curator.assign_strata(&loader, &stats.frequencies).unwrap();

        assert_eq!(stats.records_observed, 2);
        assert_eq!(assignment.load.skipped, 1);

        let numbers = assignment.bucket(Stratum::Numbers).unwrap();
        assert_eq!(numbers.members()[0].id, 0);
        let non_english = assignment.bucket(Stratum::NonEnglish).unwrap();
        assert_eq!(non_english.members()[0].id, 2);
    }

    #[test]
    fn test_run_writes_every_stratum_file() {
        let file = corpus(&[r#"{"question": "There are 7 seas", "answer": "oceans"}"#]);
        let output = TempDir::new().unwrap();

        let summary = curator(&output).run(file.path()).unwrap();

        assert_eq!(summary.total_records, 1);
        for stratum in Stratum::ALL {
            assert!(output
                .path()
                .join(format!("{}.jsonl", stratum.file_stem()))
                .exists());
        }
        assert!(output.path().join(SUMMARY_FILE).exists());
        assert!(!output.path().join(FREQUENCIES_FILE).exists());
        assert_eq!(summary.stratum(Stratum::Numbers).unwrap().members, 1);
    }

    #[test]
    fn test_malformed_corpus_writes_nothing() {
        let file = corpus(&[r#"{"question": "fine"}"#, r#"{"question": "#]);
        let output = TempDir::new().unwrap();
        let out_dir = output.path().join("out");
        let config = CurationConfig {
            output_dir: out_dir.clone(),
            ..Default::default()
        };

        let err = Curator::with_heuristic_oracle(config)
            .unwrap()
            .run(file.path())
            .unwrap_err();

        assert!(matches!(err, quizstrata_core::Error::Corpus(_)));
        assert!(!out_dir.exists());
    }
}
