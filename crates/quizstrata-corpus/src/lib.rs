//! quizstrata Corpus
//!
//! Streams a quiz corpus through the two classification passes and writes a
//! bounded, reproducible sample of every stratum.
//!
//! - [`CorpusLoader`]: JSON array or JSON-lines input, normalized on the fly
//! - [`Curator`]: pass 1 (frequencies), pass 2 (strata), then sampling
//! - [`Sampler`]: seeded uniform or category-stratified sampling
//! - [`SampleWriter`]: per-stratum JSON-lines output and `summary.json`

pub mod config;
pub mod curate;
pub mod loader;
pub mod sampling;
pub mod summary;
pub mod writer;

pub use config::CurationConfig;
pub use curate::{describe_metrics, Curator, StratumAssignment, FREQUENCIES_FILE, SUMMARY_FILE};
pub use loader::{normalize_record, CorpusFormat, CorpusLoader, LoadStats};
pub use sampling::{proportional_allocation, Sampler, SamplingMode, StratumBucket};
pub use summary::{CurationSummary, StratumSummary};
pub use writer::{write_jsonl, SampleWriter};
