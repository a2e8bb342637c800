//! Fetches HELM scenario states into a data directory.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::instrument;

use crate::catalog::TaskCatalog;
use crate::error::DataError;
use crate::store::{DataStore, TASKS_FILE};

/// Outcome of a download run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub tasks: usize,
    pub files: usize,
}

/// Sequential downloader for `{task}/{model}.json` files.
pub struct Downloader {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl Downloader {
    /// `base_url` must contain a `{run}` placeholder.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let base_url = base_url.into();
        anyhow::ensure!(
            base_url.contains("{run}"),
            "base_url must contain a {{run}} placeholder: {base_url}"
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url,
            timeout_secs,
            client,
        })
    }

    /// Write `tasks.json` into `data_dir`, then fetch every model of every
    /// task in `tasks` (all catalog tasks when empty).
    ///
    /// Stops at the first failed request.
    pub async fn download(
        &self,
        data_dir: &Path,
        catalog: &TaskCatalog,
        tasks: &[String],
    ) -> Result<DownloadSummary> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;
        catalog.save_json(&data_dir.join(TASKS_FILE))?;

        let selected: Vec<String> = if tasks.is_empty() {
            catalog.names().map(str::to_string).collect()
        } else {
            tasks.to_vec()
        };

        let store = DataStore::new(data_dir);
        let mut summary = DownloadSummary::default();
        for task in &selected {
            let spec = catalog.task(task)?;
            tracing::info!(task = task.as_str(), models = spec.models.len(), "downloading task");
            std::fs::create_dir_all(data_dir.join(task))?;

            for model in &spec.models {
                let url = spec.run_url(&self.base_url, model);
                let body = self.fetch(&url).await?;
                let path = store.model_task_path(task, model);
                std::fs::write(&path, body)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                summary.files += 1;
            }
            summary.tasks += 1;
        }

        tracing::info!(tasks = summary.tasks, files = summary.files, "download complete");
        Ok(summary)
    }

    /// GET one scenario state, returning the compact JSON text.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                DataError::Network(format!("timed out after {}s", self.timeout_secs))
            } else {
                DataError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(DataError::Http {
                status,
                url: url.to_string(),
            }
            .into());
        }

        let value: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("invalid JSON from {url}"))?;
        tracing::debug!("fetched {url}");
        Ok(serde_json::to_string(&value)?)
    }
}
