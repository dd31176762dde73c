//! Beacon CLI - command-line interface for the Beacon scoring pipeline
//!
//! Provides a `beacon` command that seeds synthetic history, checks data
//! sufficiency, trains the scoring models and scores individual entities.

mod commands;
mod progress;

use beacon_scoring::ModelKind;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use commands::{models, predict, seed, status, train, GlobalArgs};

/// Beacon - predictive scoring for leads, churn and message engagement
#[derive(Parser, Debug)]
#[command(name = "beacon", author, version, about = "Beacon - predictive scoring pipeline")]
struct Args {
    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Configuration file (defaults to ./beacon.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact directory (overrides config and BEACON_MODEL_DIR)
    #[arg(long, global = true)]
    model_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a synthetic entity snapshot
    Seed {
        /// Where to write the snapshot JSON
        #[arg(short, long)]
        out: PathBuf,

        /// Number of contacts to generate
        #[arg(long, default_value_t = 400)]
        contacts: usize,

        /// Generator seed
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },

    /// Show training-data sufficiency and stored models
    Status {
        /// Entity snapshot JSON
        #[arg(short, long)]
        data: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Train every model kind with enough data
    ///
    /// Kinds are trained independently: one kind failing or lacking data
    /// never stops the others. Exits non-zero when no kind trained.
    Train {
        /// Entity snapshot JSON
        #[arg(short, long)]
        data: PathBuf,

        /// Restrict to these kinds (repeatable)
        #[arg(short, long = "kind")]
        kinds: Vec<ModelKind>,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score one entity with a trained model
    Predict {
        /// Model kind (lead_scoring, churn, engagement)
        kind: ModelKind,

        /// Lead id, contact id or outbound message id, depending on the kind
        entity_id: String,

        /// Entity snapshot JSON
        #[arg(short, long)]
        data: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored model artifacts and their metrics
    Models {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();

    let global = GlobalArgs { config: args.config, model_dir: args.model_dir };
    let result = match args.command {
        Command::Seed { out, contacts, seed } => seed::execute(&global, &out, contacts, seed),
        Command::Status { data, json } => status::execute(&global, &data, json),
        Command::Train { data, kinds, json } => train::execute(&global, &data, kinds, json).await,
        Command::Predict { kind, entity_id, data, json } => {
            predict::execute(&global, kind, &entity_id, &data, json)
        }
        Command::Models { json } => models::execute(&global, json),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
