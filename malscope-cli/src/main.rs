//! malscope CLI: runs the cross-validated classifier comparison on a malware dataset.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// malscope: compare k-NN, SVM and logistic regression on PE-header features
#[derive(Parser, Debug)]
#[command(name = "malscope", version, about, long_about = None)]
struct Cli {
    /// Delimited dataset file (overrides `dataset.path`)
    dataset: Option<PathBuf>,

    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Classifier family to run (repeatable): knn, svm, logistic_regression
    #[arg(short, long = "family")]
    families: Vec<String>,

    /// Cross-validation fold count
    #[arg(long)]
    folds: Option<usize>,

    /// Seed for the train/test shuffle
    #[arg(long)]
    seed: Option<u64>,

    /// Write PDF plot artifacts
    #[arg(long)]
    plots: bool,

    /// Directory for plot artifacts
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep running the remaining families when one fails
    #[arg(long)]
    isolate: bool,

    /// Print the run record as JSON after the console report
    #[arg(long)]
    json: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "malscope", "malscope")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "malscope.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if let Some(command) = cli.command {
        return commands::handle_command(command, &workspace);
    }

    let overrides = commands::Overrides {
        dataset: cli.dataset,
        families: cli.families,
        folds: cli.folds,
        seed: cli.seed,
        plots: cli.plots,
        output: cli.output,
        isolate: cli.isolate,
    };
    let config = commands::resolve_config(&workspace, cli.config.as_deref(), &overrides)?;
    commands::run_experiment(config, cli.json)
}
