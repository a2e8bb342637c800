//! The `helmcurve init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("helmcurve.toml").exists() {
        println!("helmcurve.toml already exists, skipping.");
    } else {
        std::fs::write("helmcurve.toml", SAMPLE_CONFIG)?;
        println!("Created helmcurve.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit data_dir in helmcurve.toml (or set HELM_DATA_DIR)");
    println!("  2. Run: helmcurve download --tasks dyck,gsm8k");
    println!("  3. Run: helmcurve analyze --task dyck --models openai_davinci --format all");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# helmcurve configuration

# Where tasks.json and {task}/{model}.json live.
data_dir = "./helm-data"

# HELM run outputs; {run} becomes e.g. "gsm:model=openai_davinci".
base_url = "https://storage.googleapis.com/crfm-helm-public/benchmark_output/runs/v1.0/{run}/scenario_state_slim.json"

# JSON object mapping model name to parameter count, for the AUC-vs-size chart.
# Defaults to <data_dir>/models.json.
# models_file = "./models.json"

# Fix the quantile jitter for reproducible reports.
# seed = 0

num_bins = 5
request_timeout_secs = 120
"#;
