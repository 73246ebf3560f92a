//! quizstrata
//!
//! Curates a quiz corpus into three strata (clues containing numbers, clues
//! not in the primary language, clues with unusual proper nouns) and writes a
//! seeded sample of each as JSON lines.

use anyhow::{Context, Result};
use clap::Parser;
use quizstrata_classifiers::{HeuristicOracle, TextOracle};
use quizstrata_core::Stratum;
use quizstrata_corpus::{describe_metrics, CurationConfig, Curator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "quizstrata")]
#[command(about = "Curate quiz clues into number, non-English, and unusual proper noun strata", long_about = None)]
struct Cli {
    /// Corpus file (JSON array, or JSON lines with a .jsonl/.ndjson extension)
    #[arg(env = "QUIZSTRATA_SOURCE", default_value = "data/JEOPARDY_QUESTIONS1.json")]
    source_file: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "quizstrata.yaml")]
    config: PathBuf,

    /// Maximum records written per stratum
    #[arg(short = 'n', long)]
    sample_size: Option<usize>,

    /// Seed for sampling
    #[arg(short, long)]
    seed: Option<u64>,

    /// Proper nouns seen in fewer records than this are unusual
    #[arg(short, long)]
    threshold: Option<u64>,

    /// Language the corpus is expected to be in
    #[arg(long)]
    primary_language: Option<String>,

    /// Output directory
    #[arg(short, long, env = "QUIZSTRATA_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Sample proportionally to each category's share
    #[arg(long, overrides_with = "no_stratify")]
    stratify: bool,

    /// Sample uniformly regardless of category
    #[arg(long, overrides_with = "stratify")]
    no_stratify: bool,

    /// Also write the proper noun frequency map
    #[arg(long)]
    dump_frequencies: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Load the configuration file (or defaults) and apply flag overrides
    fn resolve_config(&self) -> Result<CurationConfig> {
        let mut config = CurationConfig::load(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;

        if let Some(sample_size) = self.sample_size {
            config.sample_size = sample_size;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(threshold) = self.threshold {
            config.classifier.frequency_threshold = threshold;
        }
        if let Some(language) = &self.primary_language {
            config.classifier.primary_language = language.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if self.stratify {
            config.stratify = true;
        }
        if self.no_stratify {
            config.stratify = false;
        }
        if self.dump_frequencies {
            config.dump_frequencies = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);
    describe_metrics();

    let config = cli.resolve_config()?;
    info!(
        sample_size = config.sample_size,
        seed = config.seed,
        threshold = config.classifier.frequency_threshold,
        stratify = config.stratify,
        output_dir = %config.output_dir.display(),
        "Configuration loaded"
    );

    let oracle: Arc<dyn TextOracle> = Arc::new(HeuristicOracle::new()?);
    let curator = Curator::new(config, oracle)?;
    let summary = curator
        .run(&cli.source_file)
        .with_context(|| format!("curation of {} failed", cli.source_file.display()))?;

    println!("Total records: {}", summary.total_records);
    for stratum in Stratum::ALL {
        if let Some(entry) = summary.stratum(stratum) {
            println!(
                "{:<22} {:>8} ({:>6.2}%)  sampled {:>6}",
                stratum.file_stem(),
                entry.members,
                entry.percentage,
                entry.sampled
            );
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("quizstrata=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizstrata=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
