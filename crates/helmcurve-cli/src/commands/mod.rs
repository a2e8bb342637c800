pub mod accuracy;
pub mod analyze;
pub mod download;
pub mod init;
pub mod list_tasks;

use std::path::PathBuf;

use anyhow::Result;

use helmcurve_data::config::{load_config_from, HelmcurveConfig};

/// Load config and apply a `--data-dir` override.
pub(crate) fn resolve_config(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<HelmcurveConfig> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    Ok(config)
}

/// Split a comma-separated list, dropping empty entries.
pub(crate) fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
