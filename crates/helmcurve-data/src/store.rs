//! On-disk layout of downloaded HELM results.
//!
//! ```text
//! <data_dir>/tasks.json
//! <data_dir>/<task>/<model>.json
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use helmcurve_core::accuracy::accuracy_per_model;
use helmcurve_core::model::{ModelAccuracies, Response, ScenarioState, Split};

use crate::catalog::TaskCatalog;

/// File name of the task catalog inside the data directory.
pub const TASKS_FILE: &str = "tasks.json";

/// Read access to a data directory.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.root.join(TASKS_FILE)
    }

    /// Path of one model's results for one task.
    pub fn model_task_path(&self, task: &str, model: &str) -> PathBuf {
        self.root.join(task).join(format!("{model}.json"))
    }

    /// Load `tasks.json`.
    pub fn load_tasks(&self) -> Result<TaskCatalog> {
        TaskCatalog::load_json(&self.tasks_path())
    }

    /// Load one `{task}/{model}.json` file.
    pub fn load_model_task(&self, task: &str, model: &str) -> Result<ScenarioState> {
        let path = self.model_task_path(task, model);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read results: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse results: {}", path.display()))
    }

    /// Catalog models of `task` that have a result file on disk.
    ///
    /// Missing files are skipped with a warning.
    pub fn available_models(&self, task: &str) -> Result<Vec<String>> {
        let catalog = self.load_tasks()?;
        let spec = catalog.task(task)?;
        Ok(spec
            .models
            .iter()
            .filter(|model| {
                let present = self.model_task_path(task, model).is_file();
                if !present {
                    tracing::warn!(task, model = model.as_str(), "no results on disk, skipping");
                }
                present
            })
            .cloned()
            .collect())
    }

    /// Load every available model's responses for `task` and score them.
    ///
    /// Model order follows the catalog.
    pub fn accuracy_per_model(&self, task: &str, split: Option<Split>) -> Result<ModelAccuracies> {
        let models = self.available_models(task)?;
        anyhow::ensure!(
            !models.is_empty(),
            "no result files for task {task} under {}",
            self.root.display()
        );

        let mut loaded: Vec<(String, Vec<Response>)> = Vec::with_capacity(models.len());
        for model in models {
            let state = self.load_model_task(task, &model)?;
            tracing::debug!(
                task,
                model = model.as_str(),
                responses = state.request_states.len(),
                "loaded results"
            );
            loaded.push((model, state.request_states));
        }
        tracing::info!(task, models = loaded.len(), "loaded task");

        let accuracies = accuracy_per_model(
            loaded.iter().map(|(m, r)| (m.as_str(), r.as_slice())),
            task,
            split,
        )
        .with_context(|| format!("failed to score task {task}"))?;
        Ok(accuracies)
    }
}

/// Load a `{"model": parameter_count}` map.
///
/// A missing file yields an empty map so analyses still run without the
/// AUC-vs-size series.
pub fn load_model_params(path: &Path) -> Result<HashMap<String, f64>> {
    if !path.exists() {
        tracing::info!("no parameter counts at {}, skipping size series", path.display());
        return Ok(HashMap::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read parameter counts: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse parameter counts: {}", path.display()))
}
