//! helmcurve CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use helmcurve_core::discretize::DifficultyAxis;
use helmcurve_core::model::Split;
use helmcurve_core::report::PlotKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "helmcurve",
    version,
    about = "Instance difficulty and agent-characteristic curves for HELM results"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download HELM scenario states into the data directory
    Download {
        /// Tasks to fetch (comma-separated, default: all)
        #[arg(long)]
        tasks: Option<String>,

        /// Data directory (overrides config and HELM_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List known tasks and how many models have results on disk
    ListTasks {
        /// Data directory (overrides config and HELM_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print each model's mean accuracy on a task
    Accuracy {
        /// Task name (see `list-tasks`)
        #[arg(long)]
        task: String,

        /// Restrict to one split: train, valid, test
        #[arg(long)]
        split: Option<Split>,

        /// Data directory (overrides config and HELM_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Estimate instance difficulty and fit characteristic curves
    Analyze {
        /// Task name (see `list-tasks`)
        #[arg(long)]
        task: String,

        /// Models to plot (comma-separated); excluded from the difficulty estimate
        #[arg(long)]
        models: String,

        /// Plot type: logistic, binned
        #[arg(long, default_value = "logistic")]
        plot: PlotKind,

        /// X-axis: quantile, raw
        #[arg(long, default_value = "quantile")]
        x_axis: DifficultyAxis,

        /// Buckets for the binned plot (default from config)
        #[arg(long)]
        num_bins: Option<usize>,

        /// Chance-correct difficulty for tasks with this many answer options
        #[arg(long)]
        num_options: Option<usize>,

        /// Restrict to one split: train, valid, test
        #[arg(long)]
        split: Option<Split>,

        /// Seed for the quantile jitter
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(long, default_value = "./helmcurve-results")]
        output: PathBuf,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// JSON map of model name to parameter count
        #[arg(long)]
        models_file: Option<PathBuf>,

        /// Data directory (overrides config and HELM_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter helmcurve.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("helmcurve=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Download {
            tasks,
            data_dir,
            config,
        } => commands::download::execute(tasks, data_dir, config).await,
        Commands::ListTasks { data_dir, config } => commands::list_tasks::execute(data_dir, config),
        Commands::Accuracy {
            task,
            split,
            data_dir,
            config,
        } => commands::accuracy::execute(task, split, data_dir, config),
        Commands::Analyze {
            task,
            models,
            plot,
            x_axis,
            num_bins,
            num_options,
            split,
            seed,
            output,
            format,
            models_file,
            data_dir,
            config,
        } => commands::analyze::execute(commands::analyze::AnalyzeArgs {
            task,
            models,
            plot,
            axis: x_axis,
            num_bins,
            num_options,
            split,
            seed,
            output,
            format,
            models_file,
            data_dir,
            config,
        }),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
