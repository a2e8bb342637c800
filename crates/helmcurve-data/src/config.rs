//! helmcurve configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Public HELM v1.0 run outputs; `{run}` is replaced by the run name.
pub const DEFAULT_BASE_URL: &str =
    "https://storage.googleapis.com/crfm-helm-public/benchmark_output/runs/v1.0/{run}/scenario_state_slim.json";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "HELM_DATA_DIR";

/// Top-level helmcurve configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelmcurveConfig {
    /// Directory holding `tasks.json` and `{task}/{model}.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Run URL template containing `{run}`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// JSON map of model name to parameter count.
    #[serde(default)]
    pub models_file: Option<PathBuf>,
    /// Seed for the quantile jitter; unseeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Default bucket count for binned plots.
    #[serde(default = "default_num_bins")]
    pub num_bins: usize,
    /// HTTP timeout for downloads in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./helm-data")
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_num_bins() -> usize {
    5
}
fn default_timeout() -> u64 {
    120
}

impl Default for HelmcurveConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            base_url: default_base_url(),
            models_file: None,
            seed: None,
            num_bins: default_num_bins(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl HelmcurveConfig {
    /// Path of the parameter-count file, defaulting to `<data_dir>/models.json`.
    pub fn models_path(&self) -> PathBuf {
        self.models_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("models.json"))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `helmcurve.toml` in the current directory
/// 2. `~/.config/helmcurve/config.toml`
///
/// `HELM_DATA_DIR` overrides the data directory.
pub fn load_config() -> Result<HelmcurveConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<HelmcurveConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("helmcurve.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<HelmcurveConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => HelmcurveConfig::default(),
    };

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        config.data_dir = PathBuf::from(dir);
    }

    config.data_dir = resolve_path(&config.data_dir);
    config.models_file = config.models_file.as_deref().map(resolve_path);
    config.base_url = resolve_env_vars(&config.base_url);
    anyhow::ensure!(
        config.base_url.contains("{run}"),
        "base_url must contain a {{run}} placeholder: {}",
        config.base_url
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("helmcurve"))
}
