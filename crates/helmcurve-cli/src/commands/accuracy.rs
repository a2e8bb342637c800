//! The `helmcurve accuracy` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use helmcurve_core::model::Split;
use helmcurve_data::DataStore;

use super::resolve_config;

pub fn execute(
    task: String,
    split: Option<Split>,
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(config_path, data_dir)?;
    let store = DataStore::new(&config.data_dir);
    let per_model = store.accuracy_per_model(&task, split)?;

    let mut table = Table::new();
    table.set_header(vec!["Model", "Instances", "Correct", "Accuracy"]);
    for model in &per_model {
        let correct = model.results.iter().filter(|r| r.is_correct).count();
        let accuracy = model
            .mean_accuracy()
            .map(|a| format!("{:.1}%", a * 100.0))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&model.model),
            Cell::new(model.results.len()),
            Cell::new(correct),
            Cell::new(accuracy),
        ]);
    }

    let split = split
        .map(|s| s.to_string())
        .unwrap_or_else(|| "all splits".to_string());
    println!("Task: {task} ({split})");
    println!("{table}");
    Ok(())
}
