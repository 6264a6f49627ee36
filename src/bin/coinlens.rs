//! CLI binary for coinlens.
//!
//! Prints the JSON report on stdout. All tracing output goes to stderr so
//! stdout stays machine-readable.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coin_search::{SearchAggregator, SharedRng};
use coinlens::identify::{self, Prediction};
use coinlens::AppConfig;
use tracing_subscriber::EnvFilter;

/// coinlens: find verified web pages about an Indian coin.
#[derive(Parser)]
#[command(name = "coinlens", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, env = "COINLENS_CONFIG")]
    config: Option<PathBuf>,

    /// Number of web results to return (overrides the config file).
    #[arg(long)]
    max_results: Option<usize>,

    /// Seed for header rotation and result shuffling.
    #[arg(long)]
    seed: Option<u64>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search the web for free text, e.g. "mughal rupee".
    Search {
        /// Words to search for.
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Search the web for a classifier label.
    Label {
        /// Predicted coin class.
        label: String,

        /// Classifier confidence in [0, 1].
        #[arg(long, default_value_t = 1.0)]
        confidence: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("coinlens=info,coin_search=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => AppConfig::from_file(path)?,
        None => {
            let path = AppConfig::default_config_path();
            if path.exists() {
                AppConfig::from_file(&path)?
            } else {
                AppConfig::default()
            }
        }
    };

    if let Some(max_results) = cli.max_results {
        config.search.max_results = max_results;
    }
    let search_config = config.to_search_config()?;
    let max_results = search_config.max_results;

    let rng = match cli.seed {
        Some(seed) => SharedRng::seeded(seed),
        None => SharedRng::from_entropy(),
    };
    let aggregator = SearchAggregator::with_rng(&search_config, rng)?;

    let json = match cli.command {
        Command::Search { text } => {
            let report = identify::search_text(&aggregator, &text.join(" "), max_results).await?;
            serde_json::to_string_pretty(&report)?
        }
        Command::Label { label, confidence } => {
            let prediction = Prediction::new(label, confidence)?;
            let report = identify::identify(&aggregator, prediction, max_results).await?;
            serde_json::to_string_pretty(&report)?
        }
    };

    println!("{json}");
    Ok(())
}
