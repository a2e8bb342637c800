//! The `helmcurve list-tasks` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use helmcurve_data::{default_catalog, DataStore};

use super::resolve_config;

pub fn execute(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path, data_dir)?;
    let store = DataStore::new(&config.data_dir);

    let catalog = if store.tasks_path().exists() {
        store.load_tasks()?
    } else {
        tracing::debug!(
            "no tasks.json under {}, listing built-in catalog",
            config.data_dir.display()
        );
        default_catalog()
    };

    let mut table = Table::new();
    table.set_header(vec!["Task", "Run", "Models", "Downloaded"]);
    for (name, spec) in &catalog.tasks {
        let downloaded = spec
            .models
            .iter()
            .filter(|m| store.model_task_path(name, m).is_file())
            .count();
        table.add_row(vec![
            Cell::new(name),
            Cell::new(&spec.url_param),
            Cell::new(spec.models.len()),
            Cell::new(downloaded),
        ]);
    }

    println!("{table}");
    println!("{} tasks", catalog.tasks.len());
    Ok(())
}
