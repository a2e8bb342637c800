//! The `helmcurve analyze` command.

use std::path::PathBuf;

use anyhow::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use helmcurve_core::discretize::DifficultyAxis;
use helmcurve_core::engine::{AnalysisConfig, AnalysisEngine};
use helmcurve_core::model::Split;
use helmcurve_core::report::{DifficultyReport, PlotKind};
use helmcurve_data::{load_model_params, DataStore};
use helmcurve_report::write_html_report;

use super::{resolve_config, split_list};

pub struct AnalyzeArgs {
    pub task: String,
    pub models: String,
    pub plot: PlotKind,
    pub axis: DifficultyAxis,
    pub num_bins: Option<usize>,
    pub num_options: Option<usize>,
    pub split: Option<Split>,
    pub seed: Option<u64>,
    pub output: PathBuf,
    pub format: String,
    pub models_file: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let config = resolve_config(args.config, args.data_dir)?;

    let selected = split_list(&args.models);
    anyhow::ensure!(!selected.is_empty(), "--models must name at least one model");
    let num_bins = args.num_bins.unwrap_or(config.num_bins);
    anyhow::ensure!(num_bins >= 1, "num-bins must be at least 1");
    if let Some(n) = args.num_options {
        anyhow::ensure!(n >= 1, "num-options must be at least 1");
    }

    let formats = parse_formats(&args.format)?;

    let store = DataStore::new(&config.data_dir);
    let per_model = store.accuracy_per_model(&args.task, args.split)?;
    let params = load_model_params(&args.models_file.unwrap_or_else(|| config.models_path()))?;
    for model in selected.iter().filter(|m| !params.contains_key(m.as_str())) {
        tracing::warn!(
            model = model.as_str(),
            "no parameter count, model left out of the AUC-vs-size series"
        );
    }

    let seed = args.seed.or(config.seed);
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let engine = AnalysisEngine::new(AnalysisConfig {
        plot: args.plot,
        axis: args.axis,
        num_bins,
        num_options: args.num_options,
        split: args.split,
        seed,
    });

    eprintln!(
        "helmcurve v{}: analyzing {} ({} models, {} selected)",
        env!("CARGO_PKG_VERSION"),
        args.task,
        per_model.len(),
        selected.len()
    );
    let report = engine.run(&args.task, &per_model, &selected, &params, &mut rng)?;
    tracing::info!(
        task = args.task.as_str(),
        instances = report.instance_count,
        "analysis complete"
    );

    print_summary(&report);

    std::fs::create_dir_all(&args.output)?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
    for fmt in formats {
        match fmt {
            OutputFormat::Json => {
                let path = args.output.join(format!("{}-{timestamp}.json", args.task));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            OutputFormat::Html => {
                let path = args.output.join(format!("{}-{timestamp}.html", args.task));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Html,
}

fn parse_formats(s: &str) -> Result<Vec<OutputFormat>> {
    if s == "all" {
        return Ok(vec![OutputFormat::Json, OutputFormat::Html]);
    }
    s.split(',')
        .map(|f| match f.trim() {
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => anyhow::bail!("unknown output format: {other} (expected json, html or all)"),
        })
        .collect()
}

fn print_summary(report: &DifficultyReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Model", "Accuracy", "AUC", "log10(params)"]);

    for point in &report.auc {
        let accuracy = report
            .models
            .iter()
            .find(|m| m.model == point.model)
            .and_then(|m| m.accuracy)
            .map(|a| format!("{:.1}%", a * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let log_params = point
            .log_params
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&point.model),
            Cell::new(accuracy),
            Cell::new(format!("{:.3}", point.auc)),
            Cell::new(log_params),
        ]);
    }

    println!("{table}");
}
