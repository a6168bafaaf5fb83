//! realty-advisor CLI: build the labeled dataset, train, and score listings.

use chrono::Utc;
use clap::{Parser, Subcommand};
use realty_advisor::{
    AdvisorConfig, DatasetPipeline, FeatureEngineer, InferenceAdapter, InvestmentReport,
    LabeledDataset, TargetGenerator, TrainingPipeline,
};
use std::error::Error;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "realty-advisor")]
#[command(about = "Real-estate investment classification and 5-year price estimation")]
struct Cli {
    /// JSON configuration file; missing fields take their defaults
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean raw listings, derive features and labels, write the labeled CSV
    Prepare {
        /// Raw listings CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Labeled dataset CSV to write
        #[arg(short, long, default_value = "labeled_listings.csv")]
        output: PathBuf,

        #[arg(long)]
        reference_year: Option<i32>,
    },
    /// Train both models on a labeled dataset
    Train {
        /// Labeled dataset CSV written by `prepare`
        #[arg(short, long)]
        dataset: PathBuf,

        /// Directory receiving the artifacts and the training report
        #[arg(short, long, default_value = "models")]
        out: PathBuf,

        #[arg(long)]
        reference_year: Option<i32>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        test_size: Option<f64>,

        /// Train on a random subset of at most this many rows
        #[arg(long)]
        max_rows: Option<usize>,
    },
    /// Score one listing given as a JSON object
    Predict {
        /// Directory holding the trained artifacts
        #[arg(short, long, default_value = "models")]
        models: PathBuf,

        /// Request file; reads stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Also write an HTML report to this path
        #[arg(long)]
        html: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AdvisorConfig, Box<dyn Error>> {
    Ok(match path {
        Some(path) => AdvisorConfig::from_path(path)?,
        None => AdvisorConfig::default(),
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Prepare {
            input,
            output,
            reference_year,
        } => {
            if let Some(year) = reference_year {
                config.reference_year = year;
            }
            let pipeline = DatasetPipeline::new(
                FeatureEngineer::new(config.reference_year),
                TargetGenerator::default(),
            );
            let (_, summary) = pipeline.run(&input, &output)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Train {
            dataset,
            out,
            reference_year,
            seed,
            test_size,
            max_rows,
        } => {
            if let Some(year) = reference_year {
                config.reference_year = year;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(test_size) = test_size {
                config.test_size = test_size;
            }
            if max_rows.is_some() {
                config.max_rows = max_rows;
            }
            config.validate()?;

            info!(path = %dataset.display(), "loading labeled dataset");
            let labeled = LabeledDataset::load(&dataset)?;
            let mut outcome = TrainingPipeline::new(config).train(&labeled)?;
            outcome.report.trained_at = Some(Utc::now().to_rfc3339());
            outcome.save(&out)?;
            println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        }
        Commands::Predict {
            models,
            input,
            html,
        } => {
            let request = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let request: serde_json::Value = serde_json::from_str(&request)?;

            let adapter = InferenceAdapter::from_dir(&models)?;
            let prediction = adapter.predict_json(&request)?;
            if let Some(path) = html {
                let page = InvestmentReport::render_html(&prediction, &Utc::now().to_rfc3339());
                std::fs::write(&path, page)?;
                info!(path = %path.display(), "report written");
            }
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
    }

    Ok(())
}
