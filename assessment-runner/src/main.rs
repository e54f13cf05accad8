//! Assessment runner CLI

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use assessment_runner::{
    config::Config,
    loader::load_generation_units,
    reporting::{print_console_report, MetricOutcome, QualityReport},
    scorer::{LogitFileSource, ScoreSource},
};
use itemgauge::{
    complexity, ensemble_agreement, fraction_with_distinct_options, parse_batch, unanswerability,
    QaRecord, RawGenerationUnit,
};

#[derive(Parser)]
#[command(name = "assessment-runner")]
#[command(about = "Ensemble quality assessment for machine-generated multiple-choice items")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full assessment pipeline over a generation batch
    Assess {
        /// Newline-delimited passages, one per record
        #[arg(long)]
        contexts: PathBuf,

        /// Newline-delimited raw generations, line-aligned with the passages
        #[arg(long)]
        generations: PathBuf,

        /// Logit export from the inference side
        #[arg(long)]
        logits: PathBuf,

        /// Output directory for the JSON report (defaults to config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip generations without separator structure instead of aborting
        #[arg(long)]
        skip_malformed: bool,
    },

    /// Parse and repair a batch without scoring it
    Inspect {
        /// Newline-delimited passages, one per record
        #[arg(long)]
        contexts: PathBuf,

        /// Newline-delimited raw generations, line-aligned with the passages
        #[arg(long)]
        generations: PathBuf,
    },

    /// Generate sample configuration
    InitConfig {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config/assessment.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("assessment_runner=debug,itemgauge=debug,info")
    } else {
        EnvFilter::new("assessment_runner=info,warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Assess {
            contexts,
            generations,
            logits,
            output,
            skip_malformed,
        } => {
            run_assess(&config, &contexts, &generations, &logits, output, skip_malformed)?;
        }

        Commands::Inspect {
            contexts,
            generations,
        } => {
            run_inspect(&contexts, &generations)?;
        }

        Commands::InitConfig { output } => {
            init_config(&output)?;
        }
    }

    Ok(())
}

/// Parsed, filtered, and repaired batch, ready for scoring.
struct PreparedBatch {
    records: Vec<QaRecord>,
    malformed: usize,
    distinct_fraction: MetricOutcome,
}

/// Parse the batch, measure distinctness on the raw records, then repair
/// option counts. With `skip_malformed` unset the first bad record aborts
/// the run with its index; otherwise bad records are logged and dropped.
fn prepare_batch(
    units: &[RawGenerationUnit],
    skip_malformed: bool,
) -> Result<PreparedBatch, Box<dyn std::error::Error>> {
    let mut indices = Vec::new();
    let mut records = Vec::new();
    let mut malformed = 0usize;

    for (index, outcome) in parse_batch(units).into_iter().enumerate() {
        match outcome {
            Ok(record) => {
                indices.push(index);
                records.push(record);
            }
            Err(e) => {
                if skip_malformed {
                    warn!(index, error = %e, "skipping malformed generation");
                    malformed += 1;
                } else {
                    return Err(format!("record {index}: {e}").into());
                }
            }
        }
    }

    // Measured before repair: padding can only duplicate options.
    let distinct_fraction = MetricOutcome::from_result(fraction_with_distinct_options(&records));

    let mut repaired = Vec::with_capacity(records.len());
    for (index, mut record) in indices.into_iter().zip(records) {
        match record.normalize_options() {
            Ok(()) => repaired.push(record),
            Err(e) => {
                if skip_malformed {
                    warn!(index, error = %e, "skipping unrepairable record");
                    malformed += 1;
                } else {
                    return Err(format!("record {index}: {e}").into());
                }
            }
        }
    }

    Ok(PreparedBatch {
        records: repaired,
        malformed,
        distinct_fraction,
    })
}

fn run_assess(
    config: &Config,
    contexts: &Path,
    generations: &Path,
    logits: &Path,
    output: Option<PathBuf>,
    skip_malformed_flag: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let skip_malformed = skip_malformed_flag || config.parsing.skip_malformed;

    let units = load_generation_units(contexts, generations)?;
    info!(records = units.len(), "loaded generation batch");

    let batch = prepare_batch(&units, skip_malformed)?;
    if batch.records.is_empty() {
        return Err("no parseable records in batch".into());
    }
    info!(
        parsed = batch.records.len(),
        malformed = batch.malformed,
        "batch prepared"
    );

    let source = LogitFileSource::from_file(logits, &config.ensemble)?;
    info!(source = source.name(), "loaded logit export");

    let (unanswerability_outcome, agreement_outcome) = match source.qa_logits(&batch.records) {
        Ok(qa) => (
            MetricOutcome::ok(unanswerability(&qa)),
            MetricOutcome::ok(ensemble_agreement(&qa)),
        ),
        Err(e) => {
            warn!(error = %e, "qa scoring failed");
            let message = e.to_string();
            (
                MetricOutcome::failed(message.clone()),
                MetricOutcome::failed(message),
            )
        }
    };

    let complexity_outcome = match source.complexity_logits(&batch.records) {
        Ok(cx) => MetricOutcome::ok(complexity(&cx)),
        Err(e) => {
            warn!(error = %e, "complexity scoring failed");
            MetricOutcome::failed(e.to_string())
        }
    };

    let report = QualityReport::new(
        units.len(),
        batch.malformed,
        batch.distinct_fraction,
        unanswerability_outcome,
        agreement_outcome,
        complexity_outcome,
    );
    print_console_report(&report);

    if config.output.write_json {
        let dir = output.unwrap_or_else(|| PathBuf::from(&config.output.output_dir));
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}.json", report.run_id));
        report.write_to_file(&path)?;
        info!(path = %path.display(), "wrote JSON report");
    }

    Ok(())
}

fn run_inspect(contexts: &Path, generations: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let units = load_generation_units(contexts, generations)?;
    let batch = prepare_batch(&units, true)?;

    println!("\n=== Batch Inspection ===\n");
    println!("Records:          {}", units.len());
    println!("Parsed:           {}", batch.records.len());
    println!("Malformed:        {}", batch.malformed);
    match batch.distinct_fraction.value {
        Some(fraction) => println!("Distinct options: {:.4}", fraction),
        None => println!(
            "Distinct options: {}",
            batch
                .distinct_fraction
                .error
                .as_deref()
                .unwrap_or("not computed")
        ),
    }

    Ok(())
}

fn init_config(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output, Config::sample_toml())?;
    println!("Wrote sample configuration to {}", output.display());
    Ok(())
}
