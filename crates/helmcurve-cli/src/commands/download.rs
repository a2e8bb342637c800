//! The `helmcurve download` command.

use std::path::PathBuf;

use anyhow::Result;

use helmcurve_data::{default_catalog, Downloader};

use super::{resolve_config, split_list};

pub async fn execute(
    tasks: Option<String>,
    data_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = resolve_config(config_path, data_dir)?;
    let catalog = default_catalog();

    let tasks = tasks.as_deref().map(split_list).unwrap_or_default();
    for task in &tasks {
        catalog.task(task)?;
    }

    let downloader = Downloader::new(config.base_url.clone(), config.request_timeout_secs)?;
    eprintln!(
        "Downloading {} task(s) into {}",
        if tasks.is_empty() {
            catalog.tasks.len()
        } else {
            tasks.len()
        },
        config.data_dir.display()
    );

    let summary = downloader
        .download(&config.data_dir, &catalog, &tasks)
        .await?;
    println!(
        "Downloaded {} files for {} tasks into {}",
        summary.files,
        summary.tasks,
        config.data_dir.display()
    );
    Ok(())
}
